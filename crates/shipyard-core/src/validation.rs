//! Field validation: pure predicates, no state, no I/O.

use std::fmt;

/// Punctuation accepted as the "symbol" character class.
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

/// Whole-string check for `non-ws @ non-ws . non-ws`. Deliberately loose —
/// deliverability is the mail server's problem.
pub fn is_valid_email(s: &str) -> bool {
    if s.is_empty() || s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// `Name#1234`: 3-32 arbitrary characters, a literal `#`, exactly 4 digits.
pub fn is_valid_handle(s: &str) -> bool {
    let Some((name, digits)) = s.rsplit_once('#') else {
        return false;
    };
    let name_len = name.chars().count();
    (3..=32).contains(&name_len)
        && digits.len() == 4
        && digits.chars().all(|c| c.is_ascii_digit())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordIssue {
    TooShort,
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSymbol,
}

impl fmt::Display for PasswordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            PasswordIssue::TooShort => "at least 8 characters",
            PasswordIssue::MissingUppercase => "one uppercase letter",
            PasswordIssue::MissingLowercase => "one lowercase letter",
            PasswordIssue::MissingDigit => "one number",
            PasswordIssue::MissingSymbol => "one special character",
        };
        f.write_str(msg)
    }
}

/// Violated rules in a fixed order (length, uppercase, lowercase, digit,
/// symbol) so identical input always reports identically.
pub fn password_issues(password: &str) -> Vec<PasswordIssue> {
    let mut issues = Vec::new();
    if password.chars().count() < 8 {
        issues.push(PasswordIssue::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        issues.push(PasswordIssue::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        issues.push(PasswordIssue::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        issues.push(PasswordIssue::MissingDigit);
    }
    if !password.chars().any(|c| SYMBOLS.contains(c)) {
        issues.push(PasswordIssue::MissingSymbol);
    }
    issues
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    VeryWeak,
    Weak,
    Fair,
    Good,
    Strong,
    VeryStrong,
}

impl PasswordStrength {
    pub fn label(&self) -> &'static str {
        match self {
            PasswordStrength::VeryWeak => "Very Weak",
            PasswordStrength::Weak => "Weak",
            PasswordStrength::Fair => "Fair",
            PasswordStrength::Good => "Good",
            PasswordStrength::Strong => "Strong",
            PasswordStrength::VeryStrong => "Very Strong",
        }
    }
}

/// Pure function of the password's length and its issue count.
pub fn password_strength(password: &str) -> PasswordStrength {
    let len = password.chars().count();
    let issues = password_issues(password).len();
    if len < 6 {
        PasswordStrength::VeryWeak
    } else if len < 8 || issues > 3 {
        PasswordStrength::Weak
    } else if issues > 2 {
        PasswordStrength::Fair
    } else if issues > 1 {
        PasswordStrength::Good
    } else if issues > 0 {
        PasswordStrength::Strong
    } else {
        PasswordStrength::VeryStrong
    }
}
