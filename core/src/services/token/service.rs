//! Main token service implementation

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::error;
use uuid::Uuid;

use crate::domain::entities::token::{Claims, TokenKind, TokenPair};
use crate::domain::value_objects::Principal;
use crate::errors::{DomainError, TokenError};

use super::config::TokenServiceConfig;

/// Signing and verification keys for one token kind
struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Service for minting and verifying JWT access/refresh tokens
pub struct TokenService {
    config: TokenServiceConfig,
    access_keys: KeyPair,
    refresh_keys: KeyPair,
    validation: Validation,
}

impl TokenService {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `config` - Token service configuration
    pub fn new(config: TokenServiceConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            access_keys: KeyPair::from_secret(&config.access_secret),
            refresh_keys: KeyPair::from_secret(&config.refresh_secret),
            config,
            validation,
        }
    }

    /// Access token lifetime in seconds
    pub fn access_ttl_seconds(&self) -> i64 {
        self.config.access_ttl.num_seconds()
    }

    /// Generates a new token pair (access + refresh tokens) for a user
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user's UUID
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The generated token pair
    /// * `Err(DomainError)` - Token generation failed
    pub fn generate_tokens(&self, user_id: Uuid) -> Result<TokenPair, DomainError> {
        self.generate_tokens_at(user_id, Utc::now())
    }

    /// Generates a token pair as if issued at `issued_at`
    pub fn generate_tokens_at(
        &self,
        user_id: Uuid,
        issued_at: DateTime<Utc>,
    ) -> Result<TokenPair, DomainError> {
        let access = Claims::new(
            user_id,
            TokenKind::Access,
            issued_at,
            self.config.access_ttl,
            &self.config.issuer,
            &self.config.audience,
        );
        let refresh = Claims::new(
            user_id,
            TokenKind::Refresh,
            issued_at,
            self.config.refresh_ttl,
            &self.config.issuer,
            &self.config.audience,
        );

        Ok(TokenPair {
            access_token: self.encode_jwt(&access, &self.access_keys.encoding)?,
            refresh_token: self.encode_jwt(&refresh, &self.refresh_keys.encoding)?,
            expires_in: self.access_ttl_seconds(),
        })
    }

    /// Encodes claims into a JWT
    fn encode_jwt(&self, claims: &Claims, key: &EncodingKey) -> Result<String, DomainError> {
        encode(&Header::new(Algorithm::HS256), claims, key).map_err(|e| {
            error!(event = "token_encode_failed", error = %e, "Failed to sign token");
            DomainError::Token(TokenError::TokenGenerationFailed)
        })
    }

    /// Verifies an access token and returns the claims
    ///
    /// # Errors
    ///
    /// * `TokenError::TokenExpired` - The token is past its expiry
    /// * `TokenError::InvalidSignature` - Signed with another key
    /// * `TokenError::InvalidClaims` - A refresh token or wrong issuer/audience
    /// * `TokenError::InvalidTokenFormat` - Anything else
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, DomainError> {
        let claims = decode::<Claims>(token, &self.access_keys.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => TokenError::TokenExpired,
                JwtErrorKind::InvalidSignature => TokenError::InvalidSignature,
                JwtErrorKind::InvalidIssuer | JwtErrorKind::InvalidAudience => TokenError::InvalidClaims,
                _ => TokenError::InvalidTokenFormat,
            })?
            .claims;

        if claims.typ != TokenKind::Access {
            return Err(TokenError::InvalidClaims.into());
        }
        Ok(claims)
    }

    /// Verifies a refresh token and returns the claims
    ///
    /// # Errors
    ///
    /// * `TokenError::RefreshTokenExpired` - The token is past its expiry
    /// * `TokenError::InvalidRefreshToken` - Any other failure
    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, DomainError> {
        let claims = decode::<Claims>(token, &self.refresh_keys.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => TokenError::RefreshTokenExpired,
                _ => TokenError::InvalidRefreshToken,
            })?
            .claims;

        if claims.typ != TokenKind::Refresh {
            return Err(TokenError::InvalidRefreshToken.into());
        }
        Ok(claims)
    }

    /// Resolves the principal carried by a valid access token
    pub fn authenticate(&self, access_token: &str) -> Result<Principal, DomainError> {
        let claims = self.verify_access_token(access_token)?;
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidClaims))?;
        Ok(Principal::new(user_id))
    }
}
