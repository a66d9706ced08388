//! Built-in currency table
//!
//! Rates are the value of one unit in Canadian dollars, the reference
//! currency of the built-in registry. Currencies replaced by the euro keep a
//! unit fallback rate.

use super::registry::{CurrencyRegistry, CurrencyRegistryBuilder};
use super::Currency;

/// Reference currency of [`CurrencyRegistry::builtin`]
pub const REFERENCE_CURRENCY: &str = "CAD";

/// (code, name, exponent, latest rate); majors first, the rest alphabetical
const BUILTIN_CURRENCIES: &[(&str, &str, u32, f64)] = &[
    ("USD", "U.S. dollar", 2, 0.9896),
    ("EUR", "European Euro", 2, 1.5611),
    ("GBP", "U.K. pound sterling", 2, 1.9619),
    ("CAD", "Canadian dollar", 2, 1.0),
    ("AUD", "Australian dollar", 2, 0.9507),
    ("JPY", "Japanese yen", 0, 0.009569),
    ("INR", "Indian rupee", 2, 0.02322),
    ("NZD", "New Zealand dollar", 2, 0.7793),
    ("CHF", "Swiss franc", 2, 0.9658),
    ("ZAR", "South African rand", 2, 0.1286),
    ("AED", "U.A.E. dirham", 2, 0.2694),
    ("ANG", "Neth. Antilles florin", 2, 0.556),
    ("ARS", "Argentine peso", 2, 0.3079),
    ("ATS", "Austrian schilling", 2, 1.0),
    ("BBD", "Barbadian dollar", 2, 0.5003),
    ("BEF", "Belgian franc", 2, 1.0),
    ("BHD", "Bahraini dinar", 3, 3.1517),
    ("BRL", "Brazilian real", 2, 0.5955),
    ("BSD", "Bahamian dollar", 2, 0.9896),
    ("CLP", "Chilean peso", 0, 0.002082),
    ("CNY", "Chinese renminbi", 2, 0.1427),
    ("COP", "Colombian peso", 2, 0.000557),
    ("CZK", "Czech Republic koruna", 2, 0.0622),
    ("DEM", "German deutsche mark", 2, 1.0),
    ("DKK", "Danish krone", 2, 0.2093),
    ("EGP", "Egyptian Pound", 2, 0.2232),
    ("ESP", "Spanish peseta", 0, 1.0),
    ("FIM", "Finnish markka", 2, 1.0),
    ("FJD", "Fiji dollar", 2, 0.6709),
    ("FRF", "French franc", 2, 1.0),
    // obsolete
    ("GHC", "Ghanaian cedi (old)", 2, 1.0),
    ("GHS", "Ghanaian cedi (new)", 2, 0.974),
    ("GRD", "Greek drachma", 2, 1.0),
    ("GTQ", "Guatemalan quetzal", 2, 0.1333),
    ("HKD", "Hong Kong dollar", 2, 0.126812),
    ("HNL", "Honduran lempira", 2, 0.05237),
    ("HRK", "Croatian kuna", 2, 0.2151),
    ("HUF", "Hungarian forint", 2, 0.006388),
    ("IDR", "Indonesian rupiah", 2, 0.000106),
    ("IEP", "Irish pound", 2, 1.0),
    ("ILS", "Israeli new shekel", 2, 0.2987),
    ("ISK", "Icelandic krona", 0, 0.01368),
    ("ITL", "Italian lira", 0, 1.0),
    ("JMD", "Jamaican dollar", 2, 0.01413),
    ("KRW", "South Korean won", 0, 0.000944),
    ("LKR", "Sri Lanka rupee", 2, 0.00919),
    ("LTL", "Lithuanian litas", 2, 0.3850),
    ("MAD", "Moroccan dirham", 2, 0.136),
    ("MMK", "Myanmar (Burma) kyat", 2, 1.0),
    ("MXN", "Mexican peso", 2, 0.0953),
    ("MYR", "Malaysian ringgit", 2, 0.3064),
    ("NLG", "Netherlands guilder", 2, 1.0),
    ("NOK", "Norwegian krone", 2, 0.1973),
    ("PAB", "Panamanian balboa", 2, 0.9896),
    ("PEN", "Peruvian new sol", 2, 0.3481),
    ("PHP", "Philippine peso", 2, 0.02273),
    ("PKR", "Pakistan rupee", 2, 0.01454),
    ("PLN", "Polish zloty", 2, 0.4601),
    ("PTE", "Portuguese escudo", 0, 1.0),
    ("RON", "Romanian new leu", 2, 0.4254),
    ("RSD", "Serbian dinar", 2, 0.01912),
    ("RUB", "Russian rouble", 2, 0.04206),
    ("SEK", "Swedish krona", 2, 0.1676),
    ("SGD", "Singapore dollar", 2, 0.7266),
    ("SIT", "Slovenian tolar", 2, 1.0),
    ("SKK", "Slovak koruna", 2, 0.05015),
    ("THB", "Thai baht", 2, 0.03079),
    ("TND", "Tunisian dinar", 3, 0.8516),
    // obsolete
    ("TRL", "Turkish lira", 0, 1.0),
    ("TWD", "Taiwanese new dollar", 2, 0.03246),
    ("UAH", "Ukrainian hryvnia", 2, 0.1266),
    // obsolete
    ("VEB", "Venezuelan bolivar", 0, 1.0),
    ("VEF", "Venezuelan bolivar fuerte", 2, 0.4609),
    ("VND", "Vietnamese dong", 2, 0.000061),
    ("XAF", "CFA franc", 0, 0.00238),
    ("XCD", "East Caribbean dollar", 2, 0.3734),
    ("XPF", "CFP franc", 0, 0.01308),
];

impl CurrencyRegistry {
    /// Registry holding the built-in currency table with CAD as reference
    pub fn builtin() -> Self {
        let mut builder = CurrencyRegistryBuilder::new(REFERENCE_CURRENCY);
        for &(code, name, exponent, latest_rate) in BUILTIN_CURRENCIES {
            builder.insert_static(
                Currency::new(code, name)
                    .with_exponent(exponent)
                    .with_latest_rate(latest_rate),
            );
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_complete() {
        let reg = CurrencyRegistry::builtin();
        assert_eq!(reg.len(), BUILTIN_CURRENCIES.len());
        assert_eq!(reg.len(), 77);
        assert_eq!(reg.reference_code(), "CAD");
    }

    #[test]
    fn test_builtin_codes_and_names_are_unique() {
        let reg = CurrencyRegistry::builtin();
        for cur in reg.all() {
            assert_eq!(reg.lookup_by_code(&cur.code).unwrap().name, cur.name);
            assert_eq!(reg.lookup_by_name(&cur.name).unwrap().code, cur.code);
        }
    }

    #[test]
    fn test_builtin_exponents() {
        let reg = CurrencyRegistry::builtin();
        assert_eq!(reg.lookup_by_code("JPY").unwrap().exponent, 0);
        assert_eq!(reg.lookup_by_code("BHD").unwrap().exponent, 3);
        assert_eq!(reg.lookup_by_code("TND").unwrap().exponent, 3);
        assert_eq!(reg.lookup_by_code("USD").unwrap().exponent, 2);
    }

    #[test]
    fn test_builtin_default_rates_are_positive() {
        let reg = CurrencyRegistry::builtin();
        assert!(reg.all().iter().all(|c| c.default_rate() > 0.0));
        assert_eq!(reg.lookup_by_code("CAD").unwrap().default_rate(), 1.0);
        assert_eq!(reg.lookup_by_code("EUR").unwrap().default_rate(), 1.5611);
    }
}
