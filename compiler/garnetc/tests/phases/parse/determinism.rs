//! Parsing is a pure function of source and options.

use garnet_parse::{parse_str, ParseOptions, Verbosity};

const PROGRAM: &str = r##"
# frozen_string_literal: true
class Greeter
  DEFAULT = "hi"

  def initialize(name, greeting: DEFAULT)
    @name = name
    @greeting = greeting
  end

  def greet(times = 1, &blk)
    unused = 1
    times.times { |i| blk&.call(i) }
    "#{@greeting}, #{@name}" if "literal"
  end
end

Greeter.new("a").greet 2 do |i|
  puts i
end
"##;

#[test]
fn same_input_same_output() {
    let options = ParseOptions::default().with_verbosity(Verbosity::Verbose);
    let (Ok(first), Ok(second)) = (parse_str(PROGRAM, &options), parse_str(PROGRAM, &options))
    else {
        panic!("program failed to parse");
    };
    assert_eq!(first.ast, second.ast);
    assert_eq!(first.warnings, second.warnings);
    assert!(!first.warnings.is_empty());
}

#[test]
fn same_errors_each_time() {
    let source = "def f(A)\nend\nclass a; end\n1 +";
    let options = ParseOptions::default();
    let (Err(first), Err(second)) = (parse_str(source, &options), parse_str(source, &options))
    else {
        panic!("expected syntax errors");
    };
    assert_eq!(first.rendered(), second.rendered());
    assert_eq!(first.messages().len(), 3);
}

#[test]
fn parses_in_parallel_threads() {
    let options = ParseOptions::default();
    let expected = match parse_str(PROGRAM, &options) {
        Ok(out) => out.ast,
        Err(err) => panic!("{err}"),
    };
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| parse_str(PROGRAM, &options).map(|out| out.ast)))
            .collect();
        for handle in handles {
            match handle.join() {
                Ok(Ok(ast)) => assert_eq!(ast, expected),
                Ok(Err(err)) => panic!("{err}"),
                Err(_) => panic!("parser thread panicked"),
            }
        }
    });
}
