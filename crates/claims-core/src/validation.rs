//! Ingress validation for claim payloads.
//!
//! Payloads are validated at the HTTP boundary, before any claim reaches the
//! store or the leaderboard. The core assumes well-formed inputs everywhere
//! downstream of [`NewClaim::validate`].

use crate::types::NewClaim;

/// Length of a National Provider Identifier.
const NPI_LEN: usize = 10;

impl NewClaim {
    /// Validates a claim payload for ingestion.
    ///
    /// Checks the procedure code prefix, the provider NPI format, and that
    /// every fee field is a finite number.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the payload fails validation:
    /// - [`ValidationError::InvalidProcedureCode`] if the code is not a dental
    ///   procedure code (leading `D`)
    /// - [`ValidationError::InvalidProviderNpi`] if the NPI is not exactly 10
    ///   ASCII digits
    /// - [`ValidationError::NonFiniteFee`] if a fee field is NaN or infinite
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.submitted_proc.starts_with('D') {
            return Err(ValidationError::InvalidProcedureCode(self.submitted_proc.clone()));
        }

        if self.provider_npi.len() != NPI_LEN
            || !self.provider_npi.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ValidationError::InvalidProviderNpi(self.provider_npi.clone()));
        }

        for (field, value) in [
            ("provider_fees", self.provider_fees),
            ("allowed_fees", self.allowed_fees),
            ("member_co_ins", self.member_co_ins),
            ("member_co_pay", self.member_co_pay),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteFee(field));
            }
        }

        Ok(())
    }
}

/// Errors that occur during claim payload validation.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Procedure code is not a dental code (must start with `D`).
    #[error("Invalid procedure code: {0}")]
    InvalidProcedureCode(String),

    /// Provider NPI is not exactly 10 ASCII digits.
    #[error("Invalid provider NPI: {0}")]
    InvalidProviderNpi(String),

    /// A fee field is NaN or infinite.
    #[error("Fee field is not a finite number: {0}")]
    NonFiniteFee(&'static str),
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn test_claim(proc_code: &str, npi: &str) -> NewClaim {
        NewClaim {
            service_dttm: None,
            submitted_proc: proc_code.to_string(),
            group_id: "G-1".to_string(),
            subscriber_id: "S-1".to_string(),
            provider_npi: npi.to_string(),
            provider_fees: 100.0,
            allowed_fees: 60.0,
            member_co_ins: 10.0,
            member_co_pay: 15.0,
            quadrant: None,
        }
    }

    #[test]
    fn accepts_well_formed_claim() {
        assert!(test_claim("D2150", "1234567890").validate().is_ok());
    }

    #[test]
    fn rejects_non_dental_procedure_code() {
        let result = test_claim("B2150", "1234567890").validate();
        assert!(matches!(result, Err(ValidationError::InvalidProcedureCode(code)) if code == "B2150"));
    }

    #[test]
    fn rejects_short_npi() {
        let result = test_claim("D2150", "123456789").validate();
        assert!(matches!(result, Err(ValidationError::InvalidProviderNpi(_))));
    }

    #[test]
    fn rejects_npi_with_non_digits() {
        let result = test_claim("D2150", "12345678-0").validate();
        assert!(matches!(result, Err(ValidationError::InvalidProviderNpi(_))));
    }

    #[test]
    fn rejects_npi_with_unicode_digits() {
        // Ten chars, but not ASCII digits.
        let result = test_claim("D2150", "١٢٣٤٥٦٧٨٩٠").validate();
        assert!(matches!(result, Err(ValidationError::InvalidProviderNpi(_))));
    }

    #[test]
    fn rejects_non_finite_fee() {
        let mut claim = test_claim("D2150", "1234567890");
        claim.allowed_fees = f64::NAN;
        let result = claim.validate();
        assert!(matches!(result, Err(ValidationError::NonFiniteFee("allowed_fees"))));
    }
}
