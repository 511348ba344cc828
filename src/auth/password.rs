//! Password strength checks and bcrypt hashing.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A plain text password that zxcvbn scored as hard enough to guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Check the strength of `password`.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] with zxcvbn's advice if the password scores below three.
    pub fn new(password: &str) -> Result<Self, Error> {
        Self::new_with_user_inputs(password, &[])
    }

    /// Like [ValidatedPassword::new], but passwords built from `user_inputs`,
    /// e.g. the user's name and email, count as easy to guess.
    pub fn new_with_user_inputs(password: &str, user_inputs: &[&str]) -> Result<Self, Error> {
        let entropy = zxcvbn(password, user_inputs);

        if matches!(entropy.score(), Score::Three | Score::Four) {
            return Ok(Self(password.to_owned()));
        }

        let advice = entropy
            .feedback()
            .map(Feedback::to_string)
            .unwrap_or_default();

        Err(Error::TooWeak(advice))
    }

    /// Wrap `password` without checking its strength, e.g. for demo accounts.
    pub fn new_unchecked(password: &str) -> Self {
        Self(password.to_owned())
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

/// A salted bcrypt hash of a password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The bcrypt cost used outside of tests.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with `cost` rounds. Tests use a cost of 4 to stay fast.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if bcrypt fails.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        let hash =
            bcrypt::hash(password.0, cost).map_err(|error| Error::HashingError(error.to_string()))?;

        Ok(Self(hash))
    }

    /// Wrap a hash read back from the database.
    pub fn new_unchecked(hash: &str) -> Self {
        Self(hash.to_owned())
    }

    /// Whether `password` is the one this hash was made from.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if the stored hash is not a bcrypt hash.
    pub fn verify(&self, password: &str) -> Result<bool, Error> {
        bcrypt::verify(password, &self.0).map_err(|error| Error::HashingError(error.to_string()))
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
