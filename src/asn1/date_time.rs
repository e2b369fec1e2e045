// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! The custom ASN.1 DATE-TIME value RAMF uses for `creationTime`
//! (`yyyyMMddHHmmss`, X.680's `DATE-TIME` production). Once implicitly
//! retagged to context `[2]`, its wire encoding is indistinguishable by tag
//! alone from a retagged `GeneralizedTime` (both are primitive strings
//! under the same context tag). The two are told apart only by content:
//! DATE-TIME is always exactly 14 ASCII digits, with no fractional seconds
//! and no trailing `Z` or offset, where GeneralizedTime allows both. That
//! content check is what a deserializer must use to reject a
//! GeneralizedTime-shaped value per §4.8 step 8.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DerDateTime(asn1::DateTime);

impl DerDateTime {
    pub fn new(dt: asn1::DateTime) -> Self {
        DerDateTime(dt)
    }

    pub fn as_datetime(&self) -> &asn1::DateTime {
        &self.0
    }
}

impl<'a> asn1::SimpleAsn1Readable<'a> for DerDateTime {
    // Never actually checked: every use of this type is behind an
    // `#[implicit(n)]` field, so the parser expects the declared context
    // tag directly and only `parse_data` below runs. GeneralizedTime's tag
    // is reused here purely to satisfy the trait.
    const TAG: asn1::Tag = asn1::GeneralizedTime::TAG;

    fn parse_data(data: &'a [u8]) -> asn1::ParseResult<Self> {
        if data.len() != 14 || !data.iter().all(u8::is_ascii_digit) {
            return Err(asn1::ParseError::new(asn1::ParseErrorKind::InvalidValue));
        }
        let s = std::str::from_utf8(data)
            .map_err(|_| asn1::ParseError::new(asn1::ParseErrorKind::InvalidValue))?;
        let digits = |range: std::ops::Range<usize>| {
            s[range]
                .parse::<u16>()
                .map_err(|_| asn1::ParseError::new(asn1::ParseErrorKind::InvalidValue))
        };
        let year = digits(0..4)?;
        let month = digits(4..6)? as u8;
        let day = digits(6..8)? as u8;
        let hour = digits(8..10)? as u8;
        let minute = digits(10..12)? as u8;
        let second = digits(12..14)? as u8;
        let dt = asn1::DateTime::new(year, month, day, hour, minute, second)
            .map_err(|_| asn1::ParseError::new(asn1::ParseErrorKind::InvalidValue))?;
        Ok(DerDateTime(dt))
    }
}

impl asn1::SimpleAsn1Writable for DerDateTime {
    const TAG: asn1::Tag = asn1::GeneralizedTime::TAG;

    fn write_data(&self, dest: &mut asn1::WriteBuf) -> asn1::WriteResult {
        let dt = &self.0;
        let encoded = format!(
            "{:04}{:02}{:02}{:02}{:02}{:02}",
            dt.year(),
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second()
        );
        dest.push_slice(encoded.as_bytes())
    }
}
