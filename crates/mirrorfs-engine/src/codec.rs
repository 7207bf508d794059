//! Decoders behind the closed encoding enumeration.
//!
//! Three families:
//! - UTF and single-byte codecs decoded here directly (UTF-16/32 unit
//!   handling, ASCII, Latin-1, and the table-driven CP037/CP437 pages
//!   that no ecosystem decoder carries),
//! - code-page and East-Asian character sets delegated to `encoding_rs`,
//! - transform codecs (`rot13`, `base64`, `hex`, `zlib`) that unwrap the
//!   byte stream and then interpret the result as UTF-8.
//!
//! Every failure is a [`VfsError::Decode`] naming the codec; decoding is
//! strict, there is no lossy replacement path.

use std::io::Read;

use base64::Engine as _;

use mirrorfs_types::{Encoding, VfsError};

/// Decode a byte slice with the given codec.
pub fn decode(encoding: Encoding, bytes: &[u8]) -> Result<String, VfsError> {
    use Encoding::*;

    match encoding {
        Utf8 => utf8(encoding, bytes),
        Utf8Sig => utf8(encoding, bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes)),
        Utf16 => match bytes {
            [0xFF, 0xFE, rest @ ..] => utf16(encoding, rest, u16::from_le_bytes),
            [0xFE, 0xFF, rest @ ..] => utf16(encoding, rest, u16::from_be_bytes),
            _ => utf16(encoding, bytes, u16::from_le_bytes),
        },
        Utf16Le => utf16(encoding, bytes, u16::from_le_bytes),
        Utf16Be => utf16(encoding, bytes, u16::from_be_bytes),
        Utf32 => match bytes {
            [0xFF, 0xFE, 0x00, 0x00, rest @ ..] => utf32(encoding, rest, u32::from_le_bytes),
            [0x00, 0x00, 0xFE, 0xFF, rest @ ..] => utf32(encoding, rest, u32::from_be_bytes),
            _ => utf32(encoding, bytes, u32::from_le_bytes),
        },
        Utf32Le => utf32(encoding, bytes, u32::from_le_bytes),
        Utf32Be => utf32(encoding, bytes, u32::from_be_bytes),

        Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
            Some(pos) => Err(VfsError::decode(
                encoding,
                format!("non-ascii byte at offset {pos}"),
            )),
            None => utf8(encoding, bytes),
        },
        Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        Cp037 => Ok(bytes.iter().map(|&b| CP037[b as usize]).collect()),
        Cp437 => Ok(bytes
            .iter()
            .map(|&b| {
                if b < 0x80 {
                    char::from(b)
                } else {
                    CP437_HIGH[(b - 0x80) as usize]
                }
            })
            .collect()),

        Big5 | Big5Hkscs | Cp950 => charset(encoding, encoding_rs::BIG5, bytes),
        Cp866 => charset(encoding, encoding_rs::IBM866, bytes),
        Cp874 => charset(encoding, encoding_rs::WINDOWS_874, bytes),
        Cp932 | ShiftJis => charset(encoding, encoding_rs::SHIFT_JIS, bytes),
        Cp949 | EucKr => charset(encoding, encoding_rs::EUC_KR, bytes),
        Cp1250 => charset(encoding, encoding_rs::WINDOWS_1250, bytes),
        Cp1251 => charset(encoding, encoding_rs::WINDOWS_1251, bytes),
        Cp1252 => charset(encoding, encoding_rs::WINDOWS_1252, bytes),
        Cp1253 => charset(encoding, encoding_rs::WINDOWS_1253, bytes),
        Cp1254 => charset(encoding, encoding_rs::WINDOWS_1254, bytes),
        Cp1255 => charset(encoding, encoding_rs::WINDOWS_1255, bytes),
        Cp1256 => charset(encoding, encoding_rs::WINDOWS_1256, bytes),
        Cp1257 => charset(encoding, encoding_rs::WINDOWS_1257, bytes),
        Cp1258 => charset(encoding, encoding_rs::WINDOWS_1258, bytes),
        EucJp => charset(encoding, encoding_rs::EUC_JP, bytes),
        Gb18030 => charset(encoding, encoding_rs::GB18030, bytes),
        Gbk => charset(encoding, encoding_rs::GBK, bytes),
        Iso2022Jp => charset(encoding, encoding_rs::ISO_2022_JP, bytes),
        Iso8859_2 => charset(encoding, encoding_rs::ISO_8859_2, bytes),
        Iso8859_3 => charset(encoding, encoding_rs::ISO_8859_3, bytes),
        Iso8859_4 => charset(encoding, encoding_rs::ISO_8859_4, bytes),
        Iso8859_5 => charset(encoding, encoding_rs::ISO_8859_5, bytes),
        Iso8859_6 => charset(encoding, encoding_rs::ISO_8859_6, bytes),
        Iso8859_7 => charset(encoding, encoding_rs::ISO_8859_7, bytes),
        Iso8859_8 => charset(encoding, encoding_rs::ISO_8859_8, bytes),
        Iso8859_10 => charset(encoding, encoding_rs::ISO_8859_10, bytes),
        Iso8859_13 => charset(encoding, encoding_rs::ISO_8859_13, bytes),
        Iso8859_14 => charset(encoding, encoding_rs::ISO_8859_14, bytes),
        Iso8859_15 => charset(encoding, encoding_rs::ISO_8859_15, bytes),
        Iso8859_16 => charset(encoding, encoding_rs::ISO_8859_16, bytes),
        Koi8R => charset(encoding, encoding_rs::KOI8_R, bytes),
        Koi8U => charset(encoding, encoding_rs::KOI8_U, bytes),
        Macintosh => charset(encoding, encoding_rs::MACINTOSH, bytes),

        Rot13 => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| VfsError::decode(encoding, e.to_string()))?;
            Ok(text.chars().map(rot13_char).collect())
        }
        Base64 => {
            let compact: Vec<u8> = bytes
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            let decoded = base64::engine::general_purpose::STANDARD
                .decode(&compact)
                .map_err(|e| VfsError::decode(encoding, e.to_string()))?;
            utf8(encoding, &decoded)
        }
        Hex => {
            let compact: Vec<u8> = bytes
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            let decoded =
                hex::decode(&compact).map_err(|e| VfsError::decode(encoding, e.to_string()))?;
            utf8(encoding, &decoded)
        }
        Zlib => {
            let mut decoded = Vec::new();
            flate2::read::ZlibDecoder::new(bytes)
                .read_to_end(&mut decoded)
                .map_err(|e| VfsError::decode(encoding, e.to_string()))?;
            utf8(encoding, &decoded)
        }
    }
}

fn utf8(encoding: Encoding, bytes: &[u8]) -> Result<String, VfsError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| VfsError::decode(encoding, e.to_string()))
}

fn utf16(
    encoding: Encoding,
    bytes: &[u8],
    read: fn([u8; 2]) -> u16,
) -> Result<String, VfsError> {
    if bytes.len() % 2 != 0 {
        return Err(VfsError::decode(encoding, "truncated 16-bit code unit"));
    }
    let units = bytes.chunks_exact(2).map(|pair| read([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|e| VfsError::decode(encoding, e.to_string()))
}

fn utf32(
    encoding: Encoding,
    bytes: &[u8],
    read: fn([u8; 4]) -> u32,
) -> Result<String, VfsError> {
    if bytes.len() % 4 != 0 {
        return Err(VfsError::decode(encoding, "truncated 32-bit code unit"));
    }
    bytes
        .chunks_exact(4)
        .map(|quad| {
            let unit = read([quad[0], quad[1], quad[2], quad[3]]);
            char::from_u32(unit)
                .ok_or_else(|| VfsError::decode(encoding, format!("invalid scalar {unit:#x}")))
        })
        .collect()
}

fn charset(
    encoding: Encoding,
    charset: &'static encoding_rs::Encoding,
    bytes: &[u8],
) -> Result<String, VfsError> {
    let (text, had_errors) = charset.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(VfsError::decode(encoding, "invalid byte sequence"));
    }
    Ok(text.into_owned())
}

fn rot13_char(c: char) -> char {
    match c {
        'a'..='z' => char::from((c as u8 - b'a' + 13) % 26 + b'a'),
        'A'..='Z' => char::from((c as u8 - b'A' + 13) % 26 + b'A'),
        c => c,
    }
}

/// EBCDIC code page 037 (US/Canada), byte to Unicode.
const CP037: [char; 256] = [
    '\u{00}', '\u{01}', '\u{02}', '\u{03}', '\u{9C}', '\u{09}', '\u{86}', '\u{7F}', //
    '\u{97}', '\u{8D}', '\u{8E}', '\u{0B}', '\u{0C}', '\u{0D}', '\u{0E}', '\u{0F}', //
    '\u{10}', '\u{11}', '\u{12}', '\u{13}', '\u{9D}', '\u{85}', '\u{08}', '\u{87}', //
    '\u{18}', '\u{19}', '\u{92}', '\u{8F}', '\u{1C}', '\u{1D}', '\u{1E}', '\u{1F}', //
    '\u{80}', '\u{81}', '\u{82}', '\u{83}', '\u{84}', '\u{0A}', '\u{17}', '\u{1B}', //
    '\u{88}', '\u{89}', '\u{8A}', '\u{8B}', '\u{8C}', '\u{05}', '\u{06}', '\u{07}', //
    '\u{90}', '\u{91}', '\u{16}', '\u{93}', '\u{94}', '\u{95}', '\u{96}', '\u{04}', //
    '\u{98}', '\u{99}', '\u{9A}', '\u{9B}', '\u{14}', '\u{15}', '\u{9E}', '\u{1A}', //
    ' ', '\u{A0}', 'â', 'ä', 'à', 'á', 'ã', 'å', //
    'ç', 'ñ', '¢', '.', '<', '(', '+', '|', //
    '&', 'é', 'ê', 'ë', 'è', 'í', 'î', 'ï', //
    'ì', 'ß', '!', '$', '*', ')', ';', '¬', //
    '-', '/', 'Â', 'Ä', 'À', 'Á', 'Ã', 'Å', //
    'Ç', 'Ñ', '¦', ',', '%', '_', '>', '?', //
    'ø', 'É', 'Ê', 'Ë', 'È', 'Í', 'Î', 'Ï', //
    'Ì', '`', ':', '#', '@', '\'', '=', '"', //
    'Ø', 'a', 'b', 'c', 'd', 'e', 'f', 'g', //
    'h', 'i', '«', '»', 'ð', 'ý', 'þ', '±', //
    '°', 'j', 'k', 'l', 'm', 'n', 'o', 'p', //
    'q', 'r', 'ª', 'º', 'æ', '¸', 'Æ', '¤', //
    'µ', '~', 's', 't', 'u', 'v', 'w', 'x', //
    'y', 'z', '¡', '¿', 'Ð', 'Ý', 'Þ', '®', //
    '^', '£', '¥', '·', '©', '§', '¶', '¼', //
    '½', '¾', '[', ']', '¯', '¨', '´', '×', //
    '{', 'A', 'B', 'C', 'D', 'E', 'F', 'G', //
    'H', 'I', '\u{AD}', 'ô', 'ö', 'ò', 'ó', 'õ', //
    '}', 'J', 'K', 'L', 'M', 'N', 'O', 'P', //
    'Q', 'R', '¹', 'û', 'ü', 'ù', 'ú', 'ÿ', //
    '\\', '÷', 'S', 'T', 'U', 'V', 'W', 'X', //
    'Y', 'Z', '²', 'Ô', 'Ö', 'Ò', 'Ó', 'Õ', //
    '0', '1', '2', '3', '4', '5', '6', '7', //
    '8', '9', '³', 'Û', 'Ü', 'Ù', 'Ú', '\u{9F}', //
];

/// OEM code page 437, upper half (0x80..=0xFF). The lower half is ASCII.
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', //
    'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', //
    'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', //
    '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', //
    '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', //
    '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', //
    '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', //
    'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', //
    '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{A0}', //
];
