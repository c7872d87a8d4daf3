//! Verification code generation

use std::fmt::Debug;

use rand::Rng;

use crate::domain::verification::VerificationCodeValue;

pub trait CodeGenerator: Send + Sync + Debug {
    fn generate(&self) -> VerificationCodeValue;
}

/// Uniform codes in `000000..=999999` from the thread-local CSPRNG
#[derive(Debug, Clone, Default)]
pub struct RandomCodeGenerator;

impl RandomCodeGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> VerificationCodeValue {
        let number = rand::thread_rng().gen_range(0..1_000_000u32);
        VerificationCodeValue::from_number(number)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_codes_are_six_digits() {
        let generator = RandomCodeGenerator::new();

        for _ in 0..200 {
            let code = generator.generate();
            assert_eq!(code.as_str().len(), 6);
            assert!(code.as_str().chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_random_codes_vary() {
        let generator = RandomCodeGenerator::new();
        let codes: std::collections::HashSet<_> =
            (0..50).map(|_| generator.generate().as_str().to_string()).collect();

        assert!(codes.len() > 1);
    }
}
