// ASCII
// -- CONTROL CHARACTERS
pub const SOH: u8 = 0x01; // start of header
pub const BS: u8 = 0x08; // backspace
pub const LF: u8 = 0x0A; // line feed
pub const VT: u8 = 0x0B; // vertical tab
pub const FF: u8 = 0x0C; // form feed
pub const CR: u8 = 0x0D; // carriage return
pub const SO: u8 = 0x0E; // shift out
pub const US: u8 = 0x1F; // unit separator
pub const DEL: u8 = 0x7F; // delete

// -- GRAPHIC CHARACTERS
pub const SP: u8 = 0x20; // space
pub const EXCLAMATION: u8 = 0x21; // !
pub const DQUOTE: u8 = 0x22; // "
pub const NUM: u8 = 0x23; // #
pub const DOLLAR: u8 = 0x24; // $
pub const PERCENT: u8 = 0x25; // %
pub const AMPERSAND: u8 = 0x26; // &
pub const SQUOTE: u8 = 0x27; // '
pub const ASTERISK: u8 = 0x2A; // *
pub const PLUS: u8 = 0x2B; // +
pub const MINUS: u8 = 0x2D; // -
pub const PERIOD: u8 = 0x2E; // .
pub const COL: u8 = 0x3A; // :
pub const LEFT_BRACKET: u8 = 0x5B; // [
pub const BACKSLASH: u8 = 0x5C; // \
pub const RIGHT_BRACKET: u8 = 0x5D; // ]
pub const CARRET: u8 = 0x5E; // ^
pub const UNDERSCORE: u8 = 0x5F; // _
pub const GRAVE: u8 = 0x60; // `
pub const LEFT_CURLY: u8 = 0x7B; // {
pub const PIPE: u8 = 0x7C; // |
pub const RIGHT_CURLY: u8 = 0x7D; // }
pub const TILDE: u8 = 0x7E; // ~

// GROUP OF CHARACTERS
// -- CRLF
pub const CRLF: &[u8] = &[CR, LF];
// -- CRCRLF
// Sometimes portable libraries replace CRLF by a double CRLF
// We parse it as a single CRLF to be tolerant
pub const CRCRLF: &[u8] = &[CR, CR, LF];
