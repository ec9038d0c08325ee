use std::fmt;

/// Money is represented as whole Colombian pesos. COP has no minor unit here,
/// so integer arithmetic is exact and balances never drift.
pub type Pesos = i64;

/// Format pesos the way es-CO displays currency.
/// Example: 500000 -> "$ 500.000", -1234 -> "-$ 1.234"
pub fn format_pesos(pesos: Pesos) -> String {
    let sign = if pesos < 0 { "-" } else { "" };
    let digits = pesos.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}$ {}", sign, grouped)
}

/// Parse user input into pesos.
/// Example: "100000" -> 100000, "100000.00" -> 100000
/// At most two zero decimals are accepted, so "100.000" is not read as 100.
pub fn parse_pesos(input: &str) -> Result<Pesos, ParsePesosError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParsePesosError::Empty);
    }

    let (negative, unsigned) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };

    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParsePesosError::InvalidFormat);
    }

    if let Some(fraction) = fraction {
        if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParsePesosError::InvalidFormat);
        }
        if fraction.bytes().any(|b| b != b'0') {
            return Err(ParsePesosError::FractionalPesos);
        }
    }

    let value: Pesos = whole.parse().map_err(|_| ParsePesosError::OutOfRange)?;
    Ok(if negative { -value } else { value })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsePesosError {
    Empty,
    InvalidFormat,
    FractionalPesos,
    OutOfRange,
}

impl fmt::Display for ParsePesosError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsePesosError::Empty => write!(f, "amount is empty"),
            ParsePesosError::InvalidFormat => write!(f, "invalid money format"),
            ParsePesosError::FractionalPesos => {
                write!(f, "pesos have no fractional part")
            }
            ParsePesosError::OutOfRange => write!(f, "amount is out of range"),
        }
    }
}

impl std::error::Error for ParsePesosError {}
