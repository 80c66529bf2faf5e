use std::io::{BufRead, Write};

use color_eyre::eyre::{Result, WrapErr};

use crate::ports::accounts::Account;

/// Print `question` and read one trimmed line. `None` once input is closed.
pub fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<Option<String>> {
    write!(output, "{}", question)?;
    output.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line).wrap_err("Failed to read from stdin")?;
    if read == 0 {
        writeln!(output)?;
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// y/N question, anything but yes counts as no.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<Option<bool>> {
    let answer = ask(input, output, &format!("{} [y/N] ", question))?;
    Ok(answer.map(|answer| matches!(answer.to_lowercase().as_str(), "y" | "yes")))
}

/// Numbered account chooser, asks again until the answer is valid.
pub fn choose_account<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    accounts: &[Account],
) -> Result<Option<Account>> {
    writeln!(output, "Add the video with which account?")?;
    for (index, account) in accounts.iter().enumerate() {
        writeln!(output, "  {}) {}", index + 1, account.name)?;
    }

    loop {
        let Some(answer) = ask(input, output, "Account number: ")? else {
            return Ok(None);
        };
        match answer.parse::<usize>() {
            Ok(number) if (1..=accounts.len()).contains(&number) => {
                return Ok(Some(accounts[number - 1].clone()));
            }
            _ => writeln!(output, "Pick a number between 1 and {}", accounts.len())?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::account;
    use std::io::Cursor;

    #[test]
    fn test_confirm() {
        let mut output = Vec::new();
        let mut input = Cursor::new("Y\nno\n\n");

        assert_eq!(confirm(&mut input, &mut output, "Allow?").unwrap(), Some(true));
        assert_eq!(confirm(&mut input, &mut output, "Allow?").unwrap(), Some(false));
        assert_eq!(confirm(&mut input, &mut output, "Allow?").unwrap(), Some(false));
        assert_eq!(confirm(&mut input, &mut output, "Allow?").unwrap(), None);
        assert!(String::from_utf8(output).unwrap().contains("Allow? [y/N]"));
    }

    #[test]
    fn test_choose_account_retries_invalid_answers() {
        let accounts = vec![account("a@gmail.com"), account("b@gmail.com")];
        let mut output = Vec::new();
        let mut input = Cursor::new("x\n3\n2\n");

        let chosen = choose_account(&mut input, &mut output, &accounts).unwrap();

        assert_eq!(chosen, Some(account("b@gmail.com")));
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("1) a@gmail.com"));
        assert!(output.contains("Pick a number between 1 and 2"));
    }

    #[test]
    fn test_choose_account_closed_input() {
        let accounts = vec![account("a@gmail.com"), account("b@gmail.com")];
        let mut output = Vec::new();
        let mut input = Cursor::new("");

        assert_eq!(
            choose_account(&mut input, &mut output, &accounts).unwrap(),
            None
        );
    }
}
