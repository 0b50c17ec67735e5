use super::*;
use garnet_ir::Span;
use pretty_assertions::assert_eq;

fn token(kind: TokenKind, flags: TokenFlags) -> Token {
    Token::new(kind, Span::point(0), flags, 1, 0)
}

#[test]
fn eof_closes_everything() {
    assert!(Closers::EOF.matches(&TokenKind::Eof));
    assert!(Closers::BODY.matches(&TokenKind::Eof));
}

#[test]
fn body_closers() {
    let end = TokenKind::Keyword(Keyword::End);
    let rescue = TokenKind::Keyword(Keyword::Rescue);
    let elsif = TokenKind::Keyword(Keyword::Elsif);
    assert!(Closers::BODY.matches(&end));
    assert!(Closers::BODY.matches(&rescue));
    assert!(!Closers::BODY.matches(&elsif));
    assert!(Closers::BRANCH.matches(&elsif));
    assert!(!Closers::EOF.matches(&end));
}

#[test]
fn expecting_text() {
    assert_eq!(Closers::EOF.expecting(), "end-of-input");
    assert_eq!(Closers::BODY.expecting(), "'end'");
    assert_eq!(Closers::RPAREN.expecting(), "')'");
    assert_eq!(Closers::RBRACE.expecting(), "'}'");
}

#[test]
fn statement_keywords_open_only_at_statement_start() {
    let kw = TokenKind::Keyword(Keyword::If);
    assert_eq!(nesting(&token(kw.clone(), TokenFlags::CMD_START)), Nesting::Open);
    assert_eq!(nesting(&token(kw, TokenFlags::empty())), Nesting::Flat);
    assert_eq!(
        nesting(&token(TokenKind::Keyword(Keyword::Def), TokenFlags::empty())),
        Nesting::Open
    );
    assert_eq!(
        nesting(&token(TokenKind::Keyword(Keyword::End), TokenFlags::empty())),
        Nesting::Close
    );
}
