use std::fmt::Display;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Token {
    Illegal(String),
    Eof,

    Ident(String),
    Int(i64),
    Str(String),

    // operators
    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,
    Lt,
    Gt,
    Eq,
    NotEq,

    // delimiters
    Comma,
    Semicolon,
    Colon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // keywords
    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,
}

impl Token {
    /// Maps a word to its keyword token, or to an identifier.
    pub fn from_word(word: String) -> Token {
        match word.as_str() {
            "fn" => Token::Function,
            "let" => Token::Let,
            "true" => Token::True,
            "false" => Token::False,
            "if" => Token::If,
            "else" => Token::Else,
            "return" => Token::Return,
            _ => Token::Ident(word),
        }
    }

    fn literal(&self) -> &'static str {
        match self {
            Token::Eof => "EOF",
            Token::Assign => "=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Bang => "!",
            Token::Asterisk => "*",
            Token::Slash => "/",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Eq => "==",
            Token::NotEq => "!=",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::Colon => ":",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Function => "fn",
            Token::Let => "let",
            Token::True => "true",
            Token::False => "false",
            Token::If => "if",
            Token::Else => "else",
            Token::Return => "return",
            Token::Illegal(_) | Token::Ident(_) | Token::Int(_) | Token::Str(_) => "",
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Token::Illegal(s) | Token::Ident(s) => f.write_str(s),
            Token::Int(i) => write!(f, "{}", i),
            Token::Str(s) => write!(f, "\"{}\"", s),
            t => f.write_str(t.literal()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_and_identifiers() {
        let tests = vec![
            ("fn", Token::Function),
            ("let", Token::Let),
            ("return", Token::Return),
            ("lettuce", Token::Ident("lettuce".to_string())),
            ("_x", Token::Ident("_x".to_string())),
        ];

        for (word, expected) in tests {
            assert_eq!(Token::from_word(word.to_string()), expected, "{}", word);
        }
    }

    #[test]
    fn display() {
        assert_eq!(Token::NotEq.to_string(), "!=");
        assert_eq!(Token::Str("hi".to_string()).to_string(), "\"hi\"");
        assert_eq!(Token::Int(-7).to_string(), "-7");
    }
}
