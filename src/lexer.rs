use crate::token::Token;

pub struct Lexer {
    input: Vec<char>,
    position: usize, // index of `ch`
    ch: char,        // '\0' past the end; check `at_end` rather than the char
    finished: bool,  // Eof has been handed out by the iterator
}

fn is_letter(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let input: Vec<char> = input.chars().collect();
        let ch = input.first().copied().unwrap_or('\0');
        Lexer {
            input,
            position: 0,
            ch,
            finished: false,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.ch = self.char_at(self.position);
    }

    fn char_at(&self, position: usize) -> char {
        self.input.get(position).copied().unwrap_or('\0')
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn peek(&self) -> char {
        self.char_at(self.position + 1)
    }

    /// Consumes `second` if it follows the current char, choosing between a
    /// two-char and a one-char token.
    fn either(&mut self, second: char, double: Token, single: Token) -> Token {
        if self.peek() == second {
            self.advance();
            double
        } else {
            single
        }
    }

    pub fn next_token(&mut self) -> Token {
        while self.ch.is_whitespace() {
            self.advance();
        }
        if self.at_end() {
            return Token::Eof;
        }

        let tok = match self.ch {
            '=' => self.either('=', Token::Eq, Token::Assign),
            '!' => self.either('=', Token::NotEq, Token::Bang),
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Asterisk,
            '/' => Token::Slash,
            '<' => Token::Lt,
            '>' => Token::Gt,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            ':' => Token::Colon,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '"' => self.read_string(),
            c if is_letter(c) => return Token::from_word(self.read_while(is_letter)),
            c if c.is_ascii_digit() => return self.read_number(),
            c => Token::Illegal(c.to_string()),
        };
        self.advance();
        tok
    }

    fn read_while(&mut self, pred: fn(char) -> bool) -> String {
        let start = self.position;
        while pred(self.ch) {
            self.advance();
        }
        self.input[start..self.position].iter().collect()
    }

    fn read_number(&mut self) -> Token {
        let digits = self.read_while(|c| c.is_ascii_digit());
        match digits.parse() {
            Ok(i) => Token::Int(i),
            Err(_) => Token::Illegal(digits),
        }
    }

    // leaves `ch` on the closing quote; a string running off the end is Illegal
    fn read_string(&mut self) -> Token {
        let quote = self.position;
        self.advance();
        while !self.at_end() && self.ch != '"' {
            self.advance();
        }
        if self.at_end() {
            return Token::Illegal(self.input[quote..].iter().collect());
        }
        Token::Str(self.input[quote + 1..self.position].iter().collect())
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let tok = self.next_token();
        if tok == Token::Eof {
            self.finished = true;
        }
        Some(tok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ident(s: &str) -> Token {
        Token::Ident(s.to_string())
    }

    fn input_produces_tokens(input: &str, expected: Vec<Token>) {
        let tokens: Vec<Token> = Lexer::new(input).collect();
        assert_eq!(tokens, expected, "{}", input);
    }

    #[test]
    fn let_and_function() {
        let input = r"let five = 5;
                      let add = fn(x, y) {
                          x + y;
                      };";

        input_produces_tokens(
            input,
            vec![
                Token::Let,
                ident("five"),
                Token::Assign,
                Token::Int(5),
                Token::Semicolon,
                Token::Let,
                ident("add"),
                Token::Assign,
                Token::Function,
                Token::LParen,
                ident("x"),
                Token::Comma,
                ident("y"),
                Token::RParen,
                Token::LBrace,
                ident("x"),
                Token::Plus,
                ident("y"),
                Token::Semicolon,
                Token::RBrace,
                Token::Semicolon,
                Token::Eof,
            ],
        );
    }

    #[test]
    fn operators() {
        input_produces_tokens(
            "!-/*5; 5 < 10 > 5; 10 == 10; 10 != 9;",
            vec![
                Token::Bang,
                Token::Minus,
                Token::Slash,
                Token::Asterisk,
                Token::Int(5),
                Token::Semicolon,
                Token::Int(5),
                Token::Lt,
                Token::Int(10),
                Token::Gt,
                Token::Int(5),
                Token::Semicolon,
                Token::Int(10),
                Token::Eq,
                Token::Int(10),
                Token::Semicolon,
                Token::Int(10),
                Token::NotEq,
                Token::Int(9),
                Token::Semicolon,
                Token::Eof,
            ],
        );
    }

    #[test]
    fn if_else() {
        input_produces_tokens(
            "if (5 < 10) { return true; } else { return false; }",
            vec![
                Token::If,
                Token::LParen,
                Token::Int(5),
                Token::Lt,
                Token::Int(10),
                Token::RParen,
                Token::LBrace,
                Token::Return,
                Token::True,
                Token::Semicolon,
                Token::RBrace,
                Token::Else,
                Token::LBrace,
                Token::Return,
                Token::False,
                Token::Semicolon,
                Token::RBrace,
                Token::Eof,
            ],
        );
    }

    #[test]
    fn strings() {
        input_produces_tokens(
            "\"foobar\"; \"foo bar\"; \"\"",
            vec![
                Token::Str("foobar".to_string()),
                Token::Semicolon,
                Token::Str("foo bar".to_string()),
                Token::Semicolon,
                Token::Str("".to_string()),
                Token::Eof,
            ],
        );
    }

    #[test]
    fn arrays_and_hashes() {
        input_produces_tokens(
            "[1, \"hi\"]; {\"foo\": 2}",
            vec![
                Token::LBracket,
                Token::Int(1),
                Token::Comma,
                Token::Str("hi".to_string()),
                Token::RBracket,
                Token::Semicolon,
                Token::LBrace,
                Token::Str("foo".to_string()),
                Token::Colon,
                Token::Int(2),
                Token::RBrace,
                Token::Eof,
            ],
        );
    }

    #[test]
    fn integer_limits() {
        input_produces_tokens(
            "9223372036854775807 9223372036854775808",
            vec![
                Token::Int(i64::MAX),
                Token::Illegal("9223372036854775808".to_string()),
                Token::Eof,
            ],
        );
    }

    #[test]
    fn illegal_characters() {
        input_produces_tokens(
            "a @ b",
            vec![ident("a"), Token::Illegal("@".to_string()), ident("b"), Token::Eof],
        );
    }

    #[test]
    fn nul_character_is_not_end_of_input() {
        input_produces_tokens(
            "a \0 b",
            vec![ident("a"), Token::Illegal("\0".to_string()), ident("b"), Token::Eof],
        );
    }

    #[test]
    fn unterminated_string() {
        input_produces_tokens(
            "let s = \"abc",
            vec![
                Token::Let,
                ident("s"),
                Token::Assign,
                Token::Illegal("\"abc".to_string()),
                Token::Eof,
            ],
        );
        input_produces_tokens("\"", vec![Token::Illegal("\"".to_string()), Token::Eof]);
    }
}
