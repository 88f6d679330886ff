use super::production::round_money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currencies prices are shown in. Payments are computed in `Brl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Brl,
    Usd,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Brl => "BRL",
            Currency::Usd => "USD",
        }
    }

    /// Formats `amount` the way the currency's home locale displays it:
    /// `R$ 1.234,56` for BRL and `$1,234.56` for USD.
    pub fn format(&self, amount: Decimal) -> String {
        let (prefix, group_sep, decimal_sep) = match self {
            Currency::Brl => ("R$ ", '.', ','),
            Currency::Usd => ("$", ',', '.'),
        };

        let rounded = round_money(amount);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let text = format!("{:.2}", rounded.abs());
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        format!(
            "{sign}{prefix}{}{decimal_sep}{frac_part}",
            group_thousands(int_part, group_sep)
        )
    }
}

fn group_thousands(digits: &str, sep: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
