//! The closed enumeration of text encodings.
//!
//! Text reads decode a byte range with one of these codecs. The set is
//! fixed: clients enumerate it up front (`known_encodings`) and pick by
//! name, so adding or removing a variant is an API-compatibility event.
//!
//! Alongside the character sets proper there are transform codecs
//! (`rot13`, `base64`, `hex`, `zlib`) that unwrap an encoded or
//! compressed byte stream before interpreting it as UTF-8.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A supported text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Ascii,
    Base64,
    Big5,
    Big5Hkscs,
    Cp037,
    Cp437,
    Cp866,
    Cp874,
    Cp932,
    Cp949,
    Cp950,
    Cp1250,
    Cp1251,
    Cp1252,
    Cp1253,
    Cp1254,
    Cp1255,
    Cp1256,
    Cp1257,
    Cp1258,
    EucJp,
    EucKr,
    Gb18030,
    Gbk,
    Hex,
    Iso2022Jp,
    Iso8859_2,
    Iso8859_3,
    Iso8859_4,
    Iso8859_5,
    Iso8859_6,
    Iso8859_7,
    Iso8859_8,
    Iso8859_10,
    Iso8859_13,
    Iso8859_14,
    Iso8859_15,
    Iso8859_16,
    Koi8R,
    Koi8U,
    Latin1,
    Macintosh,
    Rot13,
    ShiftJis,
    Utf16,
    Utf16Be,
    Utf16Le,
    Utf32,
    Utf32Be,
    Utf32Le,
    Utf8,
    Utf8Sig,
    Zlib,
}

impl Encoding {
    /// Every supported encoding.
    pub const ALL: &'static [Encoding] = &[
        Encoding::Ascii,
        Encoding::Base64,
        Encoding::Big5,
        Encoding::Big5Hkscs,
        Encoding::Cp037,
        Encoding::Cp437,
        Encoding::Cp866,
        Encoding::Cp874,
        Encoding::Cp932,
        Encoding::Cp949,
        Encoding::Cp950,
        Encoding::Cp1250,
        Encoding::Cp1251,
        Encoding::Cp1252,
        Encoding::Cp1253,
        Encoding::Cp1254,
        Encoding::Cp1255,
        Encoding::Cp1256,
        Encoding::Cp1257,
        Encoding::Cp1258,
        Encoding::EucJp,
        Encoding::EucKr,
        Encoding::Gb18030,
        Encoding::Gbk,
        Encoding::Hex,
        Encoding::Iso2022Jp,
        Encoding::Iso8859_2,
        Encoding::Iso8859_3,
        Encoding::Iso8859_4,
        Encoding::Iso8859_5,
        Encoding::Iso8859_6,
        Encoding::Iso8859_7,
        Encoding::Iso8859_8,
        Encoding::Iso8859_10,
        Encoding::Iso8859_13,
        Encoding::Iso8859_14,
        Encoding::Iso8859_15,
        Encoding::Iso8859_16,
        Encoding::Koi8R,
        Encoding::Koi8U,
        Encoding::Latin1,
        Encoding::Macintosh,
        Encoding::Rot13,
        Encoding::ShiftJis,
        Encoding::Utf16,
        Encoding::Utf16Be,
        Encoding::Utf16Le,
        Encoding::Utf32,
        Encoding::Utf32Be,
        Encoding::Utf32Le,
        Encoding::Utf8,
        Encoding::Utf8Sig,
        Encoding::Zlib,
    ];

    /// The canonical name clients use to select this encoding.
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Ascii => "ascii",
            Encoding::Base64 => "base64",
            Encoding::Big5 => "big5",
            Encoding::Big5Hkscs => "big5-hkscs",
            Encoding::Cp037 => "cp037",
            Encoding::Cp437 => "cp437",
            Encoding::Cp866 => "cp866",
            Encoding::Cp874 => "cp874",
            Encoding::Cp932 => "cp932",
            Encoding::Cp949 => "cp949",
            Encoding::Cp950 => "cp950",
            Encoding::Cp1250 => "cp1250",
            Encoding::Cp1251 => "cp1251",
            Encoding::Cp1252 => "cp1252",
            Encoding::Cp1253 => "cp1253",
            Encoding::Cp1254 => "cp1254",
            Encoding::Cp1255 => "cp1255",
            Encoding::Cp1256 => "cp1256",
            Encoding::Cp1257 => "cp1257",
            Encoding::Cp1258 => "cp1258",
            Encoding::EucJp => "euc-jp",
            Encoding::EucKr => "euc-kr",
            Encoding::Gb18030 => "gb18030",
            Encoding::Gbk => "gbk",
            Encoding::Hex => "hex",
            Encoding::Iso2022Jp => "iso-2022-jp",
            Encoding::Iso8859_2 => "iso-8859-2",
            Encoding::Iso8859_3 => "iso-8859-3",
            Encoding::Iso8859_4 => "iso-8859-4",
            Encoding::Iso8859_5 => "iso-8859-5",
            Encoding::Iso8859_6 => "iso-8859-6",
            Encoding::Iso8859_7 => "iso-8859-7",
            Encoding::Iso8859_8 => "iso-8859-8",
            Encoding::Iso8859_10 => "iso-8859-10",
            Encoding::Iso8859_13 => "iso-8859-13",
            Encoding::Iso8859_14 => "iso-8859-14",
            Encoding::Iso8859_15 => "iso-8859-15",
            Encoding::Iso8859_16 => "iso-8859-16",
            Encoding::Koi8R => "koi8-r",
            Encoding::Koi8U => "koi8-u",
            Encoding::Latin1 => "latin-1",
            Encoding::Macintosh => "macintosh",
            Encoding::Rot13 => "rot13",
            Encoding::ShiftJis => "shift-jis",
            Encoding::Utf16 => "utf-16",
            Encoding::Utf16Be => "utf-16-be",
            Encoding::Utf16Le => "utf-16-le",
            Encoding::Utf32 => "utf-32",
            Encoding::Utf32Be => "utf-32-be",
            Encoding::Utf32Le => "utf-32-le",
            Encoding::Utf8 => "utf-8",
            Encoding::Utf8Sig => "utf-8-sig",
            Encoding::Zlib => "zlib",
        }
    }

    /// Look up an encoding by name.
    ///
    /// Case-insensitive; underscores are treated as hyphens, so
    /// `UTF_8`, `utf_8` and `utf-8` all resolve to [`Encoding::Utf8`].
    pub fn from_name(name: &str) -> Option<Encoding> {
        let normalized: String = name
            .trim()
            .chars()
            .map(|c| match c {
                '_' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        Encoding::ALL
            .iter()
            .find(|e| e.name() == normalized)
            .copied()
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for Encoding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Encoding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Encoding::from_name(&name)
            .ok_or_else(|| D::Error::custom(format!("unknown encoding: {name:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_enumeration_is_closed_and_sized() {
        assert_eq!(Encoding::ALL.len(), 53);
    }

    #[test]
    fn every_name_round_trips() {
        for encoding in Encoding::ALL {
            assert_eq!(Encoding::from_name(encoding.name()), Some(*encoding));
        }
    }

    #[test]
    fn names_are_unique() {
        let names: Vec<&str> = Encoding::ALL.iter().map(|e| e.name()).collect();
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());
    }

    #[test]
    fn lookup_tolerates_python_style_names() {
        assert_eq!(Encoding::from_name("UTF_8"), Some(Encoding::Utf8));
        assert_eq!(Encoding::from_name("ROT13"), Some(Encoding::Rot13));
        assert_eq!(Encoding::from_name("Big5_HKSCS"), Some(Encoding::Big5Hkscs));
        assert_eq!(Encoding::from_name("no-such-codec"), None);
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&Encoding::ShiftJis).unwrap();
        assert_eq!(json, "\"shift-jis\"");
        let back: Encoding = serde_json::from_str("\"SHIFT_JIS\"").unwrap();
        assert_eq!(back, Encoding::ShiftJis);
    }
}
