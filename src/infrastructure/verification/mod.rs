//! Verification code generation and redemption

mod generator;
mod service;

pub use generator::{CodeGenerator, RandomCodeGenerator};
pub use service::VerificationService;

#[cfg(test)]
pub use generator::mock;
