//! HTML bodies for each job type.
//!
//! Rendering is pure: the same payload and settings always yield the same
//! message. User-provided text is HTML-escaped.

use crate::domain::entities::{JobPayload, OrderConfirmationEmail, OtpEmail, PasswordResetEmail};

use super::transport::EmailMessage;

/// Settings shared by all templates
#[derive(Debug, Clone)]
pub struct TemplateSettings {
    /// Public base URL of the storefront, without trailing slash
    pub app_url: String,
}

impl TemplateSettings {
    pub fn new(app_url: impl Into<String>) -> Self {
        let app_url = app_url.into();
        Self {
            app_url: app_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.app_url, token)
    }
}

/// Render the message for a payload
pub fn render(payload: &JobPayload, settings: &TemplateSettings) -> EmailMessage {
    match payload {
        JobPayload::SendOtp(data) => render_otp(data),
        JobPayload::PasswordReset(data) => render_password_reset(data, settings),
        JobPayload::OrderConfirmation(data) => render_order_confirmation(data),
    }
}

fn render_otp(data: &OtpEmail) -> EmailMessage {
    let html_body = format!(
        "<div style=\"font-family: Arial, sans-serif;\">\
<h2>Verify your email</h2>\
<p>Your verification code is:</p>\
<p style=\"font-size: 24px; font-weight: bold; letter-spacing: 4px;\">{}</p>\
<p>This code expires in 10 minutes. If you did not request it, you can ignore this email.</p>\
</div>",
        escape_html(&data.otp)
    );
    EmailMessage {
        to: data.to.clone(),
        subject: "OTP Request".to_string(),
        html_body,
    }
}

fn render_password_reset(data: &PasswordResetEmail, settings: &TemplateSettings) -> EmailMessage {
    let link = escape_html(&settings.reset_link(&data.token));
    let html_body = format!(
        "<div style=\"font-family: Arial, sans-serif;\">\
<h2>Password Reset</h2>\
<p>We received a request to reset your password. Click the link below to choose a new one:</p>\
<p><a href=\"{link}\">Reset password</a></p>\
<p>This link expires in 1 hour. If you did not request a reset, you can ignore this email.</p>\
</div>"
    );
    EmailMessage {
        to: data.to.clone(),
        subject: "Password Reset Request".to_string(),
        html_body,
    }
}

fn render_order_confirmation(data: &OrderConfirmationEmail) -> EmailMessage {
    let order = &data.order;
    let rows: String = order
        .items
        .iter()
        .map(|line| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>${:.2}</td><td>${:.2}</td></tr>",
                escape_html(&line.product_name),
                line.quantity,
                line.unit_price,
                line.line_total
            )
        })
        .collect();

    let html_body = format!(
        "<div style=\"font-family: Arial, sans-serif;\">\
<h2>Thank you for your order!</h2>\
<p>Order <strong>#{id}</strong> placed on {date}</p>\
<table border=\"1\" cellpadding=\"6\" cellspacing=\"0\">\
<thead><tr><th>Product</th><th>Qty</th><th>Price</th><th>Total</th></tr></thead>\
<tbody>{rows}</tbody>\
</table>\
<p><strong>Order total: ${total:.2}</strong></p>\
</div>",
        id = escape_html(&order.order_id),
        date = order.created_at.format("%Y-%m-%d %H:%M UTC"),
        rows = rows,
        total = order.total,
    );
    EmailMessage {
        to: data.to.clone(),
        subject: format!("Order Confirmation - #{}", order.order_id),
        html_body,
    }
}

/// Escape the five HTML-significant characters
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
