use crate::core::domain::error::ValidationError;
use zxcvbn::zxcvbn;

/// Checks a password against an optional minimum zxcvbn score.
///
/// The server is the authority on which passwords it accepts, so nothing is
/// enforced unless a minimum score was configured on the client builder.
pub(crate) fn validate_password_strength(
    password: &str,
    user_inputs: &[&str],
    min_score: Option<zxcvbn::Score>,
) -> Result<(), ValidationError> {
    let Some(min_score) = min_score else {
        return Ok(());
    };
    if password.is_empty() {
        return Err(ValidationError::Field {
            field: "password".to_string(),
            message: "Password cannot be empty".to_string(),
        });
    }
    let entropy = zxcvbn(password, user_inputs);
    if entropy.score() < min_score {
        return Err(ValidationError::ConstraintViolation(
            "Password is too weak (increase complexity)".to_string(),
        ));
    }
    Ok(())
}
