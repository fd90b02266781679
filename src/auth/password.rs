use anyhow::Context;

pub fn hash_password(plain: &str, cost: u32) -> anyhow::Result<String> {
    let hash = bcrypt::hash(plain, cost).context("bcrypt hash failed")?;
    Ok(hash)
}

// Ok(false) is a wrong password; Err is an unparseable stored hash.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let ok = bcrypt::verify(plain, stored).context("stored password hash is malformed")?;
    Ok(ok)
}
