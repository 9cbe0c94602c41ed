//! Root password hashing for autoyast profiles

use sha_crypt::{Sha512Params, sha512_simple};

use crate::{Error, Result};

/// Hash `password` as SHA-512 crypt (`$6$...`) with a random salt.
pub fn encrypt(password: &str) -> Result<String> {
    sha512_simple(password, &Sha512Params::default()).map_err(|e| Error::Password(format!("{e:?}")))
}
