use once_cell::sync::Lazy;
use serde::Serialize;

// The business operates out of the US; only +1 numbers get the daily
// submission cap and the (XXX) XXX-XXXX display mask.
pub const DOMESTIC_CALLING_CODE: &str = "+1";

#[derive(Clone, Serialize)]
pub struct CountryCallingCode {
    pub code: &'static str,
    pub country: &'static str,
}

pub static COUNTRY_CALLING_CODES: Lazy<Vec<CountryCallingCode>> = Lazy::new(|| {
    vec![
        CountryCallingCode { code: "+1", country: "United States / Canada" },
        CountryCallingCode { code: "+44", country: "United Kingdom" },
        CountryCallingCode { code: "+61", country: "Australia" },
        CountryCallingCode { code: "+64", country: "New Zealand" },
        CountryCallingCode { code: "+353", country: "Ireland" },
        CountryCallingCode { code: "+49", country: "Germany" },
        CountryCallingCode { code: "+33", country: "France" },
        CountryCallingCode { code: "+31", country: "Netherlands" },
        CountryCallingCode { code: "+34", country: "Spain" },
        CountryCallingCode { code: "+39", country: "Italy" },
        CountryCallingCode { code: "+46", country: "Sweden" },
        CountryCallingCode { code: "+47", country: "Norway" },
        CountryCallingCode { code: "+358", country: "Finland" },
        CountryCallingCode { code: "+971", country: "United Arab Emirates" },
        CountryCallingCode { code: "+91", country: "India" },
        CountryCallingCode { code: "+92", country: "Pakistan" },
        CountryCallingCode { code: "+63", country: "Philippines" },
        CountryCallingCode { code: "+65", country: "Singapore" },
        CountryCallingCode { code: "+81", country: "Japan" },
        CountryCallingCode { code: "+55", country: "Brazil" },
        CountryCallingCode { code: "+52", country: "Mexico" },
        CountryCallingCode { code: "+27", country: "South Africa" },
        CountryCallingCode { code: "+234", country: "Nigeria" },
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domestic_code_listed_first() {
        assert_eq!(COUNTRY_CALLING_CODES[0].code, DOMESTIC_CALLING_CODE);
    }

    #[test]
    fn test_codes_are_plus_prefixed() {
        for entry in COUNTRY_CALLING_CODES.iter() {
            assert!(entry.code.starts_with('+'), "bad code {}", entry.code);
        }
    }
}
