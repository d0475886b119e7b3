use anyhow::{bail, Result};
use std::io::{self, IsTerminal};
use zeroize::Zeroizing;

pub fn read_password() -> Result<Zeroizing<String>> {
    //  Environment Variable
    //  KEYMILL_PASSWORD="supersecret" keymill derive
    if let Ok(pw) = std::env::var("KEYMILL_PASSWORD") {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    //  stdin (Pipeline)
    //  printf "%s" "$KEYMILL_PASSWORD" | keymill derive
    if !io::stdin().is_terminal() {
        let mut buf = String::new();
        io::stdin().read_line(&mut buf)?;
        let pw = buf.trim_end().to_string();

        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    //  Interactive (TTY)
    if io::stdin().is_terminal() {
        let pw = rpassword::prompt_password("Password: ")?;
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    bail!("No password provided")
}
