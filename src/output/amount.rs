//! Locale-aware monetary amounts.

use crate::currency;

/// Fallback when the account locale is missing or malformed
pub const DEFAULT_LOCALE: &str = "en_US";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NumberStyle {
  group: &'static str,
  decimal: char,
  /// Symbol goes after the number, separated by a space
  symbol_after: bool,
}

const PERIOD_DECIMAL: NumberStyle = NumberStyle {
  group: ",",
  decimal: '.',
  symbol_after: false,
};

const COMMA_DECIMAL: NumberStyle = NumberStyle {
  group: ".",
  decimal: ',',
  symbol_after: true,
};

const SPACE_GROUPED: NumberStyle = NumberStyle {
  group: "\u{a0}",
  decimal: ',',
  symbol_after: true,
};

const SWISS: NumberStyle = NumberStyle {
  group: "’",
  decimal: '.',
  symbol_after: false,
};

/// Formats amounts for one locale and project currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountFormatter {
  style: NumberStyle,
  symbol: Option<&'static str>,
}

impl AmountFormatter {
  /// `locale` looks like "en_US", "de-DE" or "fr"; `currency_name` is an ISO
  /// code or a symbol. Unknown currencies format without a symbol.
  pub fn new(locale: &str, currency_name: &str) -> Self {
    Self {
      style: style_for(locale).unwrap_or(PERIOD_DECIMAL),
      symbol: currency_symbol(currency_name.trim()),
    }
  }

  pub fn has_symbol(&self) -> bool {
    self.symbol.is_some()
  }

  pub fn format(&self, amount: f64) -> String {
    let number = self.number(amount.abs());
    let sign = if amount < 0.0 && number.chars().any(|c| c.is_ascii_digit() && c != '0') {
      "-"
    } else {
      ""
    };

    match self.symbol {
      Some(symbol) if self.style.symbol_after => format!("{}{} {}", sign, number, symbol),
      Some(symbol) => format!("{}{}{}", sign, symbol, number),
      None => format!("{}{}", sign, number),
    }
  }

  fn number(&self, amount: f64) -> String {
    let fixed = format!("{:.2}", amount);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    for (i, digit) in digits.iter().enumerate() {
      if i > 0 && (digits.len() - i) % 3 == 0 {
        grouped.push_str(self.style.group);
      }
      grouped.push(*digit);
    }

    format!("{}{}{}", grouped, self.style.decimal, frac_part)
  }
}

fn currency_symbol(name: &str) -> Option<&'static str> {
  if name.is_empty() {
    return None;
  }
  // An ISO code, or a bare symbol mapped back through its code
  currency::code_to_symbol(name)
    .or_else(|| currency::symbol_to_code(name).and_then(currency::code_to_symbol))
}

fn style_for(locale: &str) -> Option<NumberStyle> {
  let locale = locale.trim().replace('-', "_");
  let valid = !locale.is_empty()
    && locale
      .split('_')
      .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()));
  if !valid {
    return None;
  }

  let mut parts = locale.split('_');
  let language = parts.next()?.to_ascii_lowercase();
  let region = parts.next().map(str::to_ascii_uppercase);

  let style = match (language.as_str(), region.as_deref()) {
    ("de" | "it" | "fr", Some("CH")) => SWISS,
    ("de" | "es" | "it" | "nl" | "pt" | "id" | "tr" | "da" | "el" | "ro" | "hr" | "sl", _) => {
      COMMA_DECIMAL
    }
    ("fr" | "ru" | "pl" | "cs" | "sk" | "sv" | "fi" | "nb" | "no" | "uk" | "hu" | "bg", _) => {
      SPACE_GROUPED
    }
    _ => PERIOD_DECIMAL,
  };
  Some(style)
}
