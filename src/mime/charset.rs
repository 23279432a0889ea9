use encoding_rs::Encoding;
use std::fmt;

/// Specific implementation of charset
///
/// This crate has its own charset list to follow IANA's one.
/// encoding_rs implements a different standard that does not know US_ASCII,
/// so using encoding_rs labels directly would lose information.
/// https://www.iana.org/assignments/character-sets/character-sets.xhtml
#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Eq, Default, Clone, Copy)]
pub enum EmailCharset {
    US_ASCII,
    ISO_8859_1,
    ISO_8859_2,
    ISO_8859_3,
    ISO_8859_4,
    ISO_8859_5,
    ISO_8859_6,
    ISO_8859_7,
    ISO_8859_8,
    ISO_8859_9,
    ISO_8859_10,
    Shift_JIS,
    EUC_JP,
    ISO_2022_KR,
    EUC_KR,
    ISO_2022_JP,
    GB2312,
    Big5,
    KOI8_R,
    Windows_1252,
    #[default]
    UTF_8,
    Unknown,
}

impl<'a> From<&'a str> for EmailCharset {
    fn from(s: &'a str) -> Self {
        // RFC 2231 permits a "*language" suffix on the charset label
        let label = s.split('*').next().unwrap_or(s);
        match label.to_ascii_lowercase().as_str() {
            "us-ascii" | "ascii" => EmailCharset::US_ASCII,
            "iso-8859-1" => EmailCharset::ISO_8859_1,
            "iso-8859-2" => EmailCharset::ISO_8859_2,
            "iso-8859-3" => EmailCharset::ISO_8859_3,
            "iso-8859-4" => EmailCharset::ISO_8859_4,
            "iso-8859-5" => EmailCharset::ISO_8859_5,
            "iso-8859-6" => EmailCharset::ISO_8859_6,
            "iso-8859-7" => EmailCharset::ISO_8859_7,
            "iso-8859-8" => EmailCharset::ISO_8859_8,
            "iso-8859-9" => EmailCharset::ISO_8859_9,
            "iso-8859-10" => EmailCharset::ISO_8859_10,
            "shift_jis" => EmailCharset::Shift_JIS,
            "euc-jp" => EmailCharset::EUC_JP,
            "iso-2022-kr" => EmailCharset::ISO_2022_KR,
            "euc-kr" => EmailCharset::EUC_KR,
            "iso-2022-jp" => EmailCharset::ISO_2022_JP,
            "gb2312" => EmailCharset::GB2312,
            "big5" => EmailCharset::Big5,
            "koi8-r" => EmailCharset::KOI8_R,
            "windows-1252" | "cp1252" => EmailCharset::Windows_1252,
            "utf-8" | "utf8" => EmailCharset::UTF_8,
            _ => EmailCharset::Unknown,
        }
    }
}

impl fmt::Display for EmailCharset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EmailCharset {
    pub fn as_str(&self) -> &'static str {
        use EmailCharset::*;
        match self {
            US_ASCII => "US-ASCII",
            ISO_8859_1 => "ISO-8859-1",
            ISO_8859_2 => "ISO-8859-2",
            ISO_8859_3 => "ISO-8859-3",
            ISO_8859_4 => "ISO-8859-4",
            ISO_8859_5 => "ISO-8859-5",
            ISO_8859_6 => "ISO-8859-6",
            ISO_8859_7 => "ISO-8859-7",
            ISO_8859_8 => "ISO-8859-8",
            ISO_8859_9 => "ISO-8859-9",
            ISO_8859_10 => "ISO-8859-10",
            Shift_JIS => "Shift_JIS",
            EUC_JP => "EUC-JP",
            ISO_2022_KR => "ISO-2022-KR",
            EUC_KR => "EUC-KR",
            ISO_2022_JP => "ISO-2022-JP",
            GB2312 => "GB2312",
            Big5 => "Big5",
            KOI8_R => "KOI8-R",
            Windows_1252 => "windows-1252",
            UTF_8 => "UTF-8",
            Unknown => "UTF-8",
        }
    }

    pub fn as_encoding(&self) -> &'static Encoding {
        Encoding::for_label(self.as_str().as_bytes()).unwrap_or(encoding_rs::WINDOWS_1252)
    }

    /// `text -> wire bytes` in this charset.
    pub fn encode(&self, s: &str) -> Vec<u8> {
        self.as_encoding().encode(s).0.into_owned()
    }

    /// `wire bytes -> text`, replacing undecodable sequences.
    pub fn decode(&self, bytes: &[u8]) -> String {
        self.as_encoding()
            .decode_without_bom_handling(bytes)
            .0
            .into_owned()
    }
}
