//! Static currency code <-> symbol table.
//!
//! Cospend stores currencies by free-form name, which in practice is either a
//! bare symbol ("$"), an ISO code ("EUR") or a description embedding a symbol
//! ("US Dollar ($)"). This table bridges ISO codes typed on the command line
//! and the symbols found in those names.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Lowercase ISO code -> display symbol. Many symbols are shared.
const CODE_TO_SYMBOL: &[(&str, &str)] = &[
  ("aed", "د.إ"),
  ("afn", "؋"),
  ("all", "Lek"),
  ("amd", "դր."),
  ("ars", "$"),
  ("aud", "$"),
  ("azn", "ман."),
  ("bam", "KM"),
  ("bdt", "৳"),
  ("bgn", "лв."),
  ("bhd", "د.ب."),
  ("bif", "FBu"),
  ("bnd", "$"),
  ("bob", "Bs"),
  ("brl", "R$"),
  ("bwp", "P"),
  ("byn", "руб."),
  ("bzd", "$"),
  ("cad", "$"),
  ("cdf", "FrCD"),
  ("chf", "CHF"),
  ("clp", "$"),
  ("cny", "¥"),
  ("cop", "$"),
  ("crc", "₡"),
  ("cup", "$"),
  ("cve", "CV$"),
  ("czk", "Kč"),
  ("djf", "Fdj"),
  ("dkk", "kr"),
  ("dop", "RD$"),
  ("dzd", "د.ج."),
  ("egp", "ج.م."),
  ("etb", "Br"),
  ("eur", "€"),
  ("gbp", "£"),
  ("gel", "GEL"),
  ("ghs", "GH₵"),
  ("gnf", "FG"),
  ("gtq", "Q"),
  ("hkd", "$"),
  ("hnl", "L"),
  ("huf", "Ft"),
  ("idr", "Rp"),
  ("ils", "₪"),
  ("inr", "₹"),
  ("iqd", "د.ع."),
  ("irr", "﷼"),
  ("isk", "kr"),
  ("jmd", "$"),
  ("jod", "د.أ."),
  ("jpy", "¥"),
  ("kes", "Ksh"),
  ("khr", "៛"),
  ("kmf", "FC"),
  ("krw", "₩"),
  ("kwd", "د.ك."),
  ("kzt", "тңг."),
  ("lbp", "ل.ل."),
  ("lkr", "Rs"),
  ("lyd", "د.ل."),
  ("mad", "د.م."),
  ("mdl", "MDL"),
  ("mga", "MGA"),
  ("mkd", "MKD"),
  ("mmk", "K"),
  ("mop", "MOP$"),
  ("mur", "MURs"),
  ("mxn", "$"),
  ("myr", "RM"),
  ("mzn", "MTn"),
  ("nad", "N$"),
  ("ngn", "₦"),
  ("nio", "C$"),
  ("nok", "kr"),
  ("npr", "Rs"),
  ("nzd", "$"),
  ("omr", "ر.ع."),
  ("pab", "B/."),
  ("pen", "S/."),
  ("php", "₱"),
  ("pkr", "₨"),
  ("pln", "zł"),
  ("pyg", "₲"),
  ("qar", "ر.ق."),
  ("ron", "RON"),
  ("rsd", "дин."),
  ("rub", "₽"),
  ("rwf", "FR"),
  ("sar", "﷼"),
  ("sdg", "SDG"),
  ("sek", "kr"),
  ("sgd", "$"),
  ("sos", "Ssh"),
  ("thb", "฿"),
  ("tnd", "د.ت."),
  ("top", "T$"),
  ("try", "₺"),
  ("ttd", "$"),
  ("twd", "NT$"),
  ("tzs", "TSh"),
  ("uah", "₴"),
  ("ugx", "USh"),
  ("usd", "$"),
  ("uyu", "$"),
  ("uzs", "UZS"),
  ("vnd", "₫"),
  ("xaf", "FCFA"),
  ("xcd", "EC$"),
  ("xof", "CFA"),
  ("yer", "ر.ي."),
  ("zar", "R"),
];

/// Codes that win the reverse lookup for shared symbols.
const PREFERRED_CODES: &[&str] = &["usd", "cny", "gbp", "eur"];

static SYMBOL_TO_CODE: OnceLock<HashMap<&'static str, String>> = OnceLock::new();

/// Look up the display symbol for an ISO code (case-insensitive).
pub fn code_to_symbol(code: &str) -> Option<&'static str> {
  let code = code.to_lowercase();
  CODE_TO_SYMBOL
    .iter()
    .find(|(c, _)| *c == code)
    .map(|(_, symbol)| *symbol)
}

/// Reverse lookup: symbol -> uppercase ISO code.
///
/// Ambiguous symbols resolve to the preferred code ("$" -> "USD",
/// "¥" -> "CNY"). The index is built on first use and reused afterwards.
pub fn symbol_to_code(symbol: &str) -> Option<&'static str> {
  symbol_index().get(symbol).map(String::as_str)
}

fn symbol_index() -> &'static HashMap<&'static str, String> {
  SYMBOL_TO_CODE.get_or_init(|| {
    let mut index = HashMap::with_capacity(CODE_TO_SYMBOL.len());

    for (code, symbol) in CODE_TO_SYMBOL {
      index.insert(*symbol, code.to_uppercase());
    }

    for code in PREFERRED_CODES {
      if let Some(symbol) = code_to_symbol(code) {
        index.insert(symbol, code.to_uppercase());
      }
    }

    index
  })
}
