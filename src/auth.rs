use anyhow::{Result, bail};
use std::io::{self, IsTerminal};
use zeroize::Zeroizing;

pub const PASSWORD_ENV: &str = "PV_PASSWORD";

pub fn read_password() -> Result<Zeroizing<String>> {
    //  Environment Variable
    //  PV_PASSWORD="supersecret" pv read api vault.pv
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        let pw = Zeroizing::new(pw);
        if !pw.is_empty() {
            return Ok(pw);
        }
    }

    //  stdin (Pipeline)
    //  printf "%s\n" "$PASSWORD" | pv read api vault.pv
    if !io::stdin().is_terminal() {
        let pw = read_stdin_line()?;
        if !pw.is_empty() {
            return Ok(pw);
        }
    }

    //  Interactive (TTY)
    if io::stdin().is_terminal() {
        let pw = Zeroizing::new(rpassword::prompt_password("Master Password: ")?);
        if !pw.is_empty() {
            return Ok(pw);
        }
    }

    bail!("no master password provided")
}

/// Reads the value to store: one stdin line when piped, a hidden prompt
/// otherwise. Empty values are allowed.
pub fn read_secret_value() -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        return read_stdin_line();
    }

    Ok(Zeroizing::new(rpassword::prompt_password("Secret Value: ")?))
}

fn read_stdin_line() -> Result<Zeroizing<String>> {
    let mut buf = Zeroizing::new(String::new());
    io::stdin().read_line(&mut buf)?;
    trim_newline(&mut buf);
    Ok(buf)
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
