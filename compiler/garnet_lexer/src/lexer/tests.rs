use super::*;
use garnet_ir::{NumberLit, StringOpen};
use pretty_assertions::assert_eq;

struct Locals(&'static [&'static str]);

impl LocalLookup for Locals {
    fn is_local(&self, name: &[u8]) -> bool {
        self.0.iter().any(|l| l.as_bytes() == name)
    }
}

fn tokens_with(src: &str, locals: &dyn LocalLookup) -> (Vec<Token>, Vec<LexError>) {
    let buf = SourceBuffer::new(src.as_bytes(), Encoding::UTF_8);
    let mut lexer = Lexer::new(&buf);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token_with(locals);
        if token.kind == TokenKind::Eof {
            break;
        }
        tokens.push(token);
        assert!(tokens.len() < 1000, "lexer made no progress on {src:?}");
    }
    (tokens, lexer.take_errors())
}

fn kinds(src: &str) -> Vec<TokenKind> {
    tokens_with(src, &NoLocals)
        .0
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn errors(src: &str) -> Vec<(LexErrorKind, Span)> {
    tokens_with(src, &NoLocals)
        .1
        .into_iter()
        .map(|e| (e.kind, e.span))
        .collect()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Ident(Name::new(name))
}

fn int(digits: &str, radix: u32) -> TokenKind {
    TokenKind::Number(Box::new(NumberLit::int(digits, radix)))
}

fn content(text: &str) -> TokenKind {
    TokenKind::StringContent(text.as_bytes().to_vec())
}

fn begin(flavor: StringFlavor, interpolates: bool) -> TokenKind {
    TokenKind::StringBegin(StringOpen {
        flavor,
        interpolates,
        command: false,
    })
}

// === Operators and names ===

#[test]
fn op_assign() {
    assert_eq!(
        kinds("a += 1"),
        vec![ident("a"), TokenKind::OpAssign(AssignOp::Add), int("1", 10)]
    );
    assert_eq!(
        kinds("a ||= b"),
        vec![ident("a"), TokenKind::OpAssign(AssignOp::OrOr), ident("b")]
    );
}

#[test]
fn slash_after_local_divides() {
    let (tokens, _) = tokens_with("x /y/", &Locals(&["x"]));
    let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![ident("x"), TokenKind::Slash, ident("y"), TokenKind::Slash]
    );
}

#[test]
fn slash_after_command_opens_regexp() {
    assert_eq!(
        kinds("x /y/"),
        vec![
            ident("x"),
            begin(StringFlavor::Regexp, true),
            content("y"),
            TokenKind::RegexpEnd("".into()),
        ]
    );
}

#[test]
fn keywords_after_dot_are_names() {
    assert_eq!(
        kinds("a.class"),
        vec![ident("a"), TokenKind::Dot, ident("class")]
    );
}

#[test]
fn method_names_after_def() {
    assert_eq!(
        kinds("def +@"),
        vec![TokenKind::Keyword(Keyword::Def), ident("+@")]
    );
    assert_eq!(
        kinds("def []=(k)"),
        vec![
            TokenKind::Keyword(Keyword::Def),
            ident("[]="),
            TokenKind::LParen,
            ident("k"),
            TokenKind::RParen,
        ]
    );
    assert_eq!(
        kinds("def foo=(v)")[1],
        ident("foo=")
    );
}

#[test]
fn labels() {
    assert_eq!(
        kinds("foo(a: 1)"),
        vec![
            ident("foo"),
            TokenKind::LParen,
            TokenKind::Label(Name::new("a")),
            int("1", 10),
            TokenKind::RParen,
        ]
    );
    assert_eq!(
        kinds(r#"{"a": 1}"#),
        vec![
            TokenKind::LBrace,
            begin(StringFlavor::Plain, true),
            content("a"),
            TokenKind::LabelEnd,
            int("1", 10),
            TokenKind::RBrace,
        ]
    );
}

#[test]
fn ternary_colon() {
    assert_eq!(
        kinds("a ? b : c"),
        vec![
            ident("a"),
            TokenKind::Question,
            ident("b"),
            TokenKind::Colon,
            ident("c"),
        ]
    );
}

#[test]
fn symbols() {
    let sym = |s: &str| TokenKind::Symbol(Name::new(s));
    assert_eq!(
        kinds("[:foo?, :+, :[]=, :@x]"),
        vec![
            TokenKind::LBracket,
            sym("foo?"),
            TokenKind::Comma,
            sym("+"),
            TokenKind::Comma,
            sym("[]="),
            TokenKind::Comma,
            sym("@x"),
            TokenKind::RBracket,
        ]
    );
}

// === Variables ===

#[test]
fn invalid_variable_names() {
    assert_eq!(
        errors("$#"),
        vec![(
            LexErrorKind::InvalidVarName {
                name: "$#".into(),
                kind: VarKind::Global
            },
            Span::new(0, 2)
        )]
    );
    assert_eq!(
        errors("@1"),
        vec![(
            LexErrorKind::InvalidVarName {
                name: "@1".into(),
                kind: VarKind::Instance
            },
            Span::new(0, 2)
        )]
    );
    assert_eq!(
        errors("@"),
        vec![(
            LexErrorKind::VarWithoutName {
                kind: VarKind::Instance
            },
            Span::new(0, 1)
        )]
    );
}

#[test]
fn special_globals() {
    assert_eq!(
        kinds("$~ $& $1"),
        vec![
            TokenKind::GVar(Name::new("$~")),
            TokenKind::BackRef(b'&'),
            TokenKind::NthRef(1),
        ]
    );
}

// === Literals ===

#[test]
fn interpolation() {
    assert_eq!(
        kinds(r#""a#{b}c""#),
        vec![
            begin(StringFlavor::Plain, true),
            content("a"),
            TokenKind::InterpBegin,
            ident("b"),
            TokenKind::InterpEnd,
            content("c"),
            TokenKind::StringEnd,
        ]
    );
}

#[test]
fn interpolated_ivar() {
    assert_eq!(
        kinds(r##""#@foo""##),
        vec![
            begin(StringFlavor::Plain, true),
            TokenKind::InterpVar,
            TokenKind::IVar(Name::new("@foo")),
            TokenKind::StringEnd,
        ]
    );
}

#[test]
fn hash_without_name_is_text() {
    assert_eq!(
        kinds(r##""#$ x""##),
        vec![
            begin(StringFlavor::Plain, true),
            content("#$ x"),
            TokenKind::StringEnd
        ]
    );
}

#[test]
fn word_list() {
    assert_eq!(
        kinds("%w[a b]"),
        vec![
            begin(StringFlavor::Words, false),
            content("a"),
            TokenKind::WordSep,
            content("b"),
            TokenKind::StringEnd,
        ]
    );
}

#[test]
fn nested_delimiters() {
    assert_eq!(
        kinds("%q(a(b)c)"),
        vec![
            begin(StringFlavor::Plain, false),
            content("a(b)c"),
            TokenKind::StringEnd
        ]
    );
}

#[test]
fn single_quotes_keep_backslashes() {
    assert_eq!(
        kinds(r"'a\nb\'c'"),
        vec![
            begin(StringFlavor::Plain, false),
            content(r"a\nb'c"),
            TokenKind::StringEnd
        ]
    );
}

#[test]
fn regexp_options() {
    let (tokens, errs) = tokens_with("/a/imz", &NoLocals);
    assert_eq!(tokens[2].kind, TokenKind::RegexpEnd("im".into()));
    assert_eq!(
        errs.into_iter().map(|e| (e.kind, e.span)).collect::<Vec<_>>(),
        vec![(
            LexErrorKind::UnknownRegexpOptions {
                options: "z".into()
            },
            Span::new(3, 6)
        )]
    );
}

#[test]
fn unknown_percent_type() {
    assert_eq!(
        errors("%z()"),
        vec![(LexErrorKind::UnknownPercentType, Span::new(0, 2))]
    );
}

#[test]
fn unterminated_string_is_closed_at_eof() {
    let (tokens, errs) = tokens_with("\"abc", &NoLocals);
    let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            begin(StringFlavor::Plain, true),
            content("abc"),
            TokenKind::StringEnd
        ]
    );
    assert_eq!(errs.len(), 1);
    assert_eq!(
        errs[0].kind,
        LexErrorKind::UnterminatedLiteral { what: "string" }
    );
    assert_eq!(errs[0].span, Span::new(0, 1));
    assert_eq!(errs[0].end_of_input, Some(4));
}

#[test]
fn char_literals() {
    assert_eq!(kinds("?a"), vec![TokenKind::Char(b"a".to_vec())]);
    assert_eq!(kinds(r"?\n"), vec![TokenKind::Char(vec![b'\n'])]);
    assert_eq!(kinds("?ab"), vec![TokenKind::Question, ident("ab")]);
}

// === Heredocs ===

#[test]
fn heredoc_body_is_read_out_of_line() {
    let heredoc = TokenKind::StringBegin(StringOpen {
        flavor: StringFlavor::Heredoc,
        interpolates: true,
        command: false,
    });
    assert_eq!(
        kinds("a = <<EOS\nhello\nEOS\nb"),
        vec![
            ident("a"),
            TokenKind::Assign,
            heredoc,
            content("hello\n"),
            TokenKind::StringEnd,
            TokenKind::Newline,
            ident("b"),
        ]
    );
}

#[test]
fn two_heredocs_on_one_line() {
    let got: Vec<_> = kinds("f(<<A, <<B)\na\nA\nb\nB\n")
        .into_iter()
        .filter(|k| matches!(k, TokenKind::StringContent(_) | TokenKind::RParen))
        .collect();
    assert_eq!(got, vec![content("a\n"), content("b\n"), TokenKind::RParen]);
}

#[test]
fn squiggly_heredoc_strips_common_indent() {
    let got: Vec<_> = kinds("<<~EOS\n  a\n    b\n  EOS\n")
        .into_iter()
        .filter(|k| matches!(k, TokenKind::StringContent(_)))
        .collect();
    assert_eq!(got, vec![content("a\n"), content("  b\n")]);
}

#[test]
fn heredoc_crlf_lines() {
    let got: Vec<_> = kinds("x = <<FOO\r\n1\r\nFOO\r\n")
        .into_iter()
        .filter(|k| matches!(k, TokenKind::StringContent(_)))
        .collect();
    assert_eq!(got, vec![content("1\n")]);
}

#[test]
fn unterminated_heredoc() {
    assert_eq!(
        errors("<<A\nfoo\n"),
        vec![(
            LexErrorKind::UnterminatedHeredoc { ident: "A".into() },
            Span::new(0, 3)
        )]
    );
}

#[test]
fn shl_without_identifier() {
    assert_eq!(
        kinds("<<--"),
        vec![TokenKind::Shl, TokenKind::Minus, TokenKind::Minus]
    );
}

// === Numbers ===

#[test]
fn number_forms() {
    let mut rational = NumberLit::int("3", 10);
    rational.rational = true;
    let mut imaginary = NumberLit::int("2", 10);
    imaginary.imaginary = true;
    assert_eq!(
        kinds("0x1f 0b101 017 1_000 1.5e3 3r 2i"),
        vec![
            int("1f", 16),
            int("101", 2),
            int("17", 8),
            int("1000", 10),
            TokenKind::Number(Box::new(NumberLit::float(1500.0))),
            TokenKind::Number(Box::new(rational)),
            TokenKind::Number(Box::new(imaginary)),
        ]
    );
}

#[test]
fn number_errors() {
    assert_eq!(
        errors("1_E"),
        vec![(LexErrorKind::TrailingUnderscore, Span::new(1, 2))]
    );
    assert_eq!(
        errors("1__2"),
        vec![(LexErrorKind::TrailingUnderscore, Span::new(1, 2))]
    );
    assert!(!kinds("1__2 + 3")
        .iter()
        .any(|k| matches!(k, TokenKind::Ident(_))));
    assert_eq!(
        errors("0x"),
        vec![(LexErrorKind::NumericWithoutDigits, Span::new(0, 2))]
    );
    assert_eq!(
        errors("09"),
        vec![(LexErrorKind::InvalidOctalDigit, Span::new(1, 2))]
    );
    assert_eq!(
        errors("1e10000"),
        vec![(
            LexErrorKind::FloatOutOfRange {
                text: "1e10000".into()
            },
            Span::new(0, 7)
        )]
    );
}

#[test]
fn stray_fractions() {
    assert_eq!(
        errors("1.2.3"),
        vec![(LexErrorKind::FractionAfterNumeric, Span::new(3, 5))]
    );
    assert_eq!(
        errors(".5"),
        vec![(LexErrorKind::LeadingDotFloat, Span::new(0, 2))]
    );
}

#[test]
fn suffix_running_into_name_is_not_a_suffix() {
    assert_eq!(kinds("1rx"), vec![int("1", 10), ident("rx")]);
}

// === Layout ===

#[test]
fn leading_dot_continues_statement() {
    assert_eq!(
        kinds("a\n.b"),
        vec![ident("a"), TokenKind::Dot, ident("b")]
    );
    assert_eq!(
        kinds("a # c\n  &.b"),
        vec![ident("a"), TokenKind::AndDot, ident("b")]
    );
    assert_eq!(
        kinds("a\nb"),
        vec![ident("a"), TokenKind::Newline, ident("b")]
    );
}

#[test]
fn newline_after_operator_is_insignificant() {
    assert_eq!(
        kinds("a +\nb"),
        vec![ident("a"), TokenKind::Plus, ident("b")]
    );
}

#[test]
fn embedded_documents() {
    assert_eq!(kinds("=begin\nfoo\n=end\nx"), vec![ident("x")]);
    assert_eq!(
        errors("=begin\nfoo"),
        vec![(LexErrorKind::UnterminatedEmbeddedDoc, Span::new(0, 6))]
    );
    let (_, errs) = tokens_with("=begin\nfoo", &NoLocals);
    assert_eq!(errs[0].end_of_input, Some(10));
}

#[test]
fn end_markers_stop_lexing() {
    assert_eq!(
        kinds("a\n__END__\nb"),
        vec![ident("a"), TokenKind::Newline]
    );
    assert_eq!(kinds("a\0b"), vec![ident("a")]);
    assert_eq!(kinds("a\x04b"), vec![ident("a")]);
}

#[test]
fn token_positions_and_flags() {
    let (tokens, _) = tokens_with("a  b\n c", &NoLocals);
    assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
    assert!(tokens[0].flags.contains(TokenFlags::CMD_START | TokenFlags::LINE_START));
    assert_eq!((tokens[1].line, tokens[1].column), (1, 4));
    assert_eq!(tokens[1].flags, TokenFlags::SPACE_BEFORE);
    assert_eq!(tokens[2].kind, TokenKind::Newline);
    assert_eq!((tokens[3].line, tokens[3].column), (2, 2));
    assert!(tokens[3].flags.contains(
        TokenFlags::SPACE_BEFORE | TokenFlags::CMD_START | TokenFlags::LINE_START
    ));
}

// === Bytes ===

#[test]
fn control_bytes() {
    assert_eq!(kinds("\x01"), vec![TokenKind::InvalidByte(1)]);
    assert_eq!(
        errors("\x01"),
        vec![(LexErrorKind::InvalidChar { byte: 1 }, Span::new(0, 1))]
    );
}

#[test]
fn carriage_return_warns() {
    let errs = errors("a\rb");
    assert_eq!(errs, vec![(LexErrorKind::CarriageReturn, Span::new(1, 2))]);
}

#[test]
fn invalid_multibyte_in_name() {
    let buf = SourceBuffer::new(b"a\xff", Encoding::UTF_8);
    let mut lexer = Lexer::new(&buf);
    assert_eq!(lexer.next_token().kind, TokenKind::Ident(Name::from_bytes(b"a\xff")));
    assert_eq!(lexer.take_errors()[0].message(), "invalid multibyte char (UTF-8)");
}

#[test]
fn utf16_bom_stops_lexing() {
    let buf = SourceBuffer::new(b"\xff\xfea\0", Encoding::UTF_8);
    let mut lexer = Lexer::new(&buf);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    let errs = lexer.take_errors();
    assert_eq!(errs[0].message(), "UTF-16LE is not ASCII compatible");
    assert_eq!(errs[0].span, Span::new(0, 2));
}
