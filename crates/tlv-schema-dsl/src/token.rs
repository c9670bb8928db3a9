use logos::Logos;

/// Tokens produced by the TLV schema lexer.
///
/// Whitespace and non-doc comments are skipped automatically by logos; `///`
/// doc comments are lexed as [`Token::DocComment`] so the parser can attach
/// them to the construct that follows.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//(?:[^/\n][^\n]*)?")]
#[logos(skip r"/\*([^*]|\*[^/])*\*/")]
pub enum Token {
    // -- structural keywords --
    #[token("namespace")]
    Namespace,
    #[token("includes")]
    Includes,
    #[token("VENDOR")]
    Vendor,
    #[token("PROFILE")]
    Profile,
    #[token("MESSAGE")]
    Message,
    #[token("STATUS")]
    Status,
    #[token("CODE")]
    Code,
    #[token("EMPTY")]
    Empty,

    // -- qualifier keywords --
    #[token("id")]
    Id,
    #[token("tag")]
    Tag,
    #[token("range")]
    Range,
    #[token("length")]
    Length,
    #[token("extensible")]
    Extensible,
    #[token("optional")]
    Optional,
    #[token("private")]
    Private,
    #[token("invariant")]
    Invariant,
    #[token("nullable")]
    Nullable,
    #[token("tag-order")]
    TagOrder,
    #[token("schema-order")]
    SchemaOrder,
    #[token("any-order")]
    AnyOrder,
    #[token("8bit")]
    Bit8,
    #[token("16bit")]
    Bit16,
    #[token("32bit")]
    Bit32,
    #[token("64bit")]
    Bit64,

    // -- type keywords --
    #[token("SIGNED")]
    Signed,
    #[token("UNSIGNED")]
    Unsigned,
    #[token("INTEGER")]
    Integer,
    #[token("FLOAT")]
    FloatKw,
    #[token("BOOLEAN")]
    BooleanKw,
    #[token("STRING")]
    StringKw,
    #[token("BYTE")]
    Byte,
    #[token("NULL")]
    NullKw,
    #[token("ANY")]
    AnyKw,
    #[token("STRUCTURE")]
    Structure,
    #[token("FIELD")]
    Field,
    #[token("GROUP")]
    Group,
    #[token("ARRAY")]
    Array,
    #[token("LIST")]
    List,
    #[token("CHOICE")]
    Choice,
    #[token("OF")]
    Of,

    // -- punctuation --
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("=>")]
    FatArrow,
    #[token("*")]
    Star,
    #[token("?")]
    Question,
    #[token("+")]
    Plus,
    #[token("..")]
    DotDot,
    #[token("=")]
    Equals,

    // -- literals --
    /// `///` doc comment line, already stripped of the leading `///`.
    #[regex(r"///[^\n]*", |lex| lex.slice()[3..].to_string())]
    DocComment(String),

    /// A double-quoted identifier, enabling keywords-as-names, e.g. `"INTEGER"`.
    #[regex(r#""([^"\\]|\\.)*""#)]
    QuotedName,

    /// A bare identifier, possibly dotted (`a.b.c`) for scoped names.
    #[regex(r"[A-Za-z_][A-Za-z0-9_-]*(\.[A-Za-z_][A-Za-z0-9_-]*)*")]
    Ident,

    /// An integer literal: decimal or `0x`-prefixed hex, optionally negative.
    #[regex(r"-?(0[xX][0-9a-fA-F]+|[0-9]+)", priority = 2)]
    IntLiteral,

    /// A decimal literal with a fractional part.
    #[regex(r"-?[0-9]+\.[0-9]+", priority = 3)]
    DecimalLiteral,
}

impl Token {
    /// A human-readable description of this token kind, used in parse errors.
    pub fn description(&self) -> String {
        match self {
            Self::Namespace => "'namespace'".into(),
            Self::Includes => "'includes'".into(),
            Self::Vendor => "'VENDOR'".into(),
            Self::Profile => "'PROFILE'".into(),
            Self::Message => "'MESSAGE'".into(),
            Self::Status => "'STATUS'".into(),
            Self::Code => "'CODE'".into(),
            Self::Empty => "'EMPTY'".into(),
            Self::Id => "'id'".into(),
            Self::Tag => "'tag'".into(),
            Self::Range => "'range'".into(),
            Self::Length => "'length'".into(),
            Self::Extensible => "'extensible'".into(),
            Self::Optional => "'optional'".into(),
            Self::Private => "'private'".into(),
            Self::Invariant => "'invariant'".into(),
            Self::Nullable => "'nullable'".into(),
            Self::TagOrder => "'tag-order'".into(),
            Self::SchemaOrder => "'schema-order'".into(),
            Self::AnyOrder => "'any-order'".into(),
            Self::Bit8 => "'8bit'".into(),
            Self::Bit16 => "'16bit'".into(),
            Self::Bit32 => "'32bit'".into(),
            Self::Bit64 => "'64bit'".into(),
            Self::Signed => "'SIGNED'".into(),
            Self::Unsigned => "'UNSIGNED'".into(),
            Self::Integer => "'INTEGER'".into(),
            Self::FloatKw => "'FLOAT'".into(),
            Self::BooleanKw => "'BOOLEAN'".into(),
            Self::StringKw => "'STRING'".into(),
            Self::Byte => "'BYTE'".into(),
            Self::NullKw => "'NULL'".into(),
            Self::AnyKw => "'ANY'".into(),
            Self::Structure => "'STRUCTURE'".into(),
            Self::Field => "'FIELD'".into(),
            Self::Group => "'GROUP'".into(),
            Self::Array => "'ARRAY'".into(),
            Self::List => "'LIST'".into(),
            Self::Choice => "'CHOICE'".into(),
            Self::Of => "'OF'".into(),
            Self::LBrace => "'{'".into(),
            Self::RBrace => "'}'".into(),
            Self::LBracket => "'['".into(),
            Self::RBracket => "']'".into(),
            Self::LParen => "'('".into(),
            Self::RParen => "')'".into(),
            Self::Colon => "':'".into(),
            Self::Comma => "','".into(),
            Self::FatArrow => "'=>'".into(),
            Self::Star => "'*'".into(),
            Self::Question => "'?'".into(),
            Self::Plus => "'+'".into(),
            Self::DotDot => "'..'".into(),
            Self::Equals => "'='".into(),
            Self::DocComment(_) => "doc comment".into(),
            Self::QuotedName => "quoted name".into(),
            Self::Ident => "identifier".into(),
            Self::IntLiteral => "integer literal".into(),
            Self::DecimalLiteral => "decimal literal".into(),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        Token::lexer(input).map(|r| r.expect("lex error")).collect()
    }

    #[test]
    fn structural_keywords() {
        let tokens = lex("namespace VENDOR PROFILE MESSAGE STATUS CODE EMPTY includes");
        assert_eq!(
            tokens,
            vec![
                Token::Namespace,
                Token::Vendor,
                Token::Profile,
                Token::Message,
                Token::Status,
                Token::Code,
                Token::Empty,
                Token::Includes,
            ]
        );
    }

    #[test]
    fn type_keywords() {
        let tokens = lex("SIGNED UNSIGNED INTEGER FLOAT BOOLEAN STRING BYTE NULL ANY STRUCTURE FIELD GROUP ARRAY LIST CHOICE OF");
        assert_eq!(tokens.len(), 16);
    }

    #[test]
    fn punctuation() {
        let tokens = lex("{ } [ ] ( ) : , => * ? + ..");
        assert_eq!(
            tokens,
            vec![
                Token::LBrace,
                Token::RBrace,
                Token::LBracket,
                Token::RBracket,
                Token::LParen,
                Token::RParen,
                Token::Colon,
                Token::Comma,
                Token::FatArrow,
                Token::Star,
                Token::Question,
                Token::Plus,
                Token::DotDot,
            ]
        );
    }

    #[test]
    fn bit_widths() {
        let tokens = lex("8bit 16bit 32bit 64bit");
        assert_eq!(tokens, vec![Token::Bit8, Token::Bit16, Token::Bit32, Token::Bit64]);
    }

    #[test]
    fn identifiers_and_dotted_names() {
        let tokens = lex("foo foo_bar a.b.c foo-b _foo");
        assert_eq!(
            tokens,
            vec![Token::Ident, Token::Ident, Token::Ident, Token::Ident, Token::Ident]
        );
    }

    #[test]
    fn quoted_name_keyword_escape() {
        let tokens = lex(r#""INTEGER" "STRUCTURE""#);
        assert_eq!(tokens, vec![Token::QuotedName, Token::QuotedName]);
    }

    #[test]
    fn integer_and_hex_literals() {
        let tokens = lex("42 -10 0x235A 0XFF");
        assert_eq!(
            tokens,
            vec![
                Token::IntLiteral,
                Token::IntLiteral,
                Token::IntLiteral,
                Token::IntLiteral,
            ]
        );
    }

    #[test]
    fn decimal_literal() {
        let tokens = lex("3.14 -2.5");
        assert_eq!(tokens, vec![Token::DecimalLiteral, Token::DecimalLiteral]);
    }

    #[test]
    fn doc_comment_captures_text() {
        let mut lexer = Token::lexer("/// hello world\nfoo");
        let first = lexer.next().unwrap().unwrap();
        assert_eq!(first, Token::DocComment(" hello world".to_string()));
        assert_eq!(lexer.next().unwrap().unwrap(), Token::Ident);
    }

    #[test]
    fn line_comments_skipped() {
        let tokens = lex("VENDOR // this is a comment\nPROFILE");
        assert_eq!(tokens, vec![Token::Vendor, Token::Profile]);
    }

    #[test]
    fn block_comments_skipped() {
        let tokens = lex("VENDOR /* block comment */ PROFILE");
        assert_eq!(tokens, vec![Token::Vendor, Token::Profile]);
    }

    #[test]
    fn description_is_human_readable() {
        assert_eq!(Token::Vendor.description(), "'VENDOR'");
        assert_eq!(Token::Ident.description(), "identifier");
    }
}
