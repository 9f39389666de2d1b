//! Webhook ingress for the flowline platform.
//!
//! Trigger webhooks are authenticated here, before any workflow side
//! effect: HMAC-SHA256 signatures over the raw request body for generic
//! webhooks (Google Forms), and the Stripe `stripe-signature` header scheme
//! for payment events. Verified payloads are validated, shaped into the
//! run's initial context data, and handed to the [`RunLauncher`].

pub mod error;
pub mod google_form;
pub mod launch;
pub mod stripe;
pub mod webhook_auth;

pub use error::{LaunchError, PayloadError, SignatureError};
pub use google_form::{GoogleFormPayload, google_form_initial_data, parse_google_form_payload};
pub use launch::RunLauncher;
pub use stripe::{
    DEFAULT_TOLERANCE_SECONDS, StripeSignature, parse_signature_header, stripe_initial_data,
    verify_stripe_signature,
};
pub use webhook_auth::{generate_webhook_secret, sign_payload, verify_signature};
