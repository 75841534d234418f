use kumiki::prelude::*;
use proptest::prelude::*;

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

proptest! {
    #[test]
    fn star_never_fails(text in "[a-c]{0,12}") {
        let input = chars(&text);
        let outcome = prefix_parse(&input, &star(sym('a'))).unwrap();
        let leading = text.chars().take_while(|c| *c == 'a').count();
        prop_assert_eq!(outcome.value.map(|v| v.len()), Some(leading));
        prop_assert_eq!(outcome.consumed, leading);
    }

    #[test]
    fn failed_branch_restores_cursor(text in "[ab]{0,8}") {
        // 失敗した分岐は入力を消費しない
        let branch = seq(seq(lit('a'), lit('b')), lit('!'));
        let input = chars(&text);
        let outcome = prefix_parse(&input, &alt(branch, eps())).unwrap();
        prop_assert_eq!(outcome.consumed, 0);
        prop_assert!(outcome.value.is_some());
    }

    #[test]
    fn full_parse_consumes_everything(text in "[0-9]{1,9}( [0-9]{1,9}){0,4}") {
        let numbers = plus(uint::<u64>());
        let input = chars(&text);
        let parsed = skip_parse(&input, &numbers, space()).unwrap();
        let expected: Vec<u64> = text.split(' ').map(|n| n.parse().unwrap()).collect();
        prop_assert_eq!(parsed, Some(expected));

        let mut extended = input.clone();
        extended.push('x');
        prop_assert_eq!(skip_parse(&extended, &numbers, space()).unwrap(), None);
    }

    #[test]
    fn calculator_matches_float_arithmetic(a in 0u32..1000, b in 0u32..1000, c in 1u32..1000) {
        let calc = kumiki::analyzer::parsers::Calculator::new().unwrap();
        let text = format!("({} - {}) * {} + {}", a, b, c, a);
        let expected = (f64::from(a) - f64::from(b)) * f64::from(c) + f64::from(a);
        prop_assert_eq!(calc.evaluate(&text).unwrap(), Some(expected));
    }
}
