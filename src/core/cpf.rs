//! CPF (Cadastro de Pessoas Físicas) validation and formatting
//!
//! A CPF is an 11-digit Brazilian taxpayer number whose last two digits are
//! checksum digits derived from the first nine. All functions here are pure
//! and total: malformed input yields `false` or a truncated string, never a
//! panic.

/// Strip every non-decimal-digit character, preserving digit order.
/// Idempotent.
pub fn normalize(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validate a candidate CPF.
///
/// Rejects anything that does not normalize to exactly 11 digits, the
/// all-same-digit numbers (rejected by definition even where the arithmetic
/// would pass), and any string whose verifier digits do not match the
/// weighted mod-11 checksum.
pub fn is_valid(input: &str) -> bool {
    let digits = normalize(input);
    if digits.len() != 11 {
        return false;
    }

    let d: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();

    // All-same-digit numbers are invalid by definition
    if d.iter().all(|&x| x == d[0]) {
        return false;
    }

    if verifier_digit(&d[..9], 10) != d[9] {
        return false;
    }
    if verifier_digit(&d[..10], 11) != d[10] {
        return false;
    }

    true
}

/// Weighted mod-11 checksum digit: digit `i` weighs `first_weight - i`,
/// and a result of 10 collapses to 0.
fn verifier_digit(digits: &[u32], first_weight: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &digit)| digit * (first_weight - i as u32))
        .sum();
    let rest = (sum * 10) % 11;
    if rest == 10 {
        0
    } else {
        rest
    }
}

/// Format a CPF for display as `ddd.ddd.ddd-dd`.
///
/// Purely positional, no validation: short input produces a truncated
/// result, and digits past position 9 all land after the hyphen.
pub fn format(input: &str) -> String {
    let digits = normalize(input);
    let slice = |from: usize, to: usize| {
        let end = to.min(digits.len());
        let start = from.min(end);
        &digits[start..end]
    };
    let tail_start = 9.min(digits.len());
    format!(
        "{}.{}.{}-{}",
        slice(0, 3),
        slice(3, 6),
        slice(6, 9),
        &digits[tail_start..],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_valid_cpf_formatted_and_bare() {
        assert!(is_valid("123.456.789-09"));
        assert!(is_valid("12345678909"));
    }

    #[test]
    fn test_wrong_verifier_digit() {
        assert!(!is_valid("123.456.789-10"));
        assert!(!is_valid("123.456.789-00"));
    }

    #[test]
    fn test_wrong_length() {
        assert!(!is_valid(""));
        assert!(!is_valid("123.456.789"));
        assert!(!is_valid("123456789091"));
        assert!(!is_valid("1234567890"));
    }

    #[test]
    fn test_all_same_digits_rejected() {
        for digit in 0..=9 {
            let cpf: String = std::iter::repeat(char::from(b'0' + digit)).take(11).collect();
            assert!(!is_valid(&cpf), "{} should be invalid", cpf);
        }
        assert!(!is_valid("111.111.111-11"));
    }

    #[test]
    fn test_non_digit_noise_ignored() {
        assert!(is_valid(" 123 456 789 09 "));
        assert!(is_valid("cpf: 123.456.789-09"));
    }

    #[test]
    fn test_normalize_idempotent() {
        for s in ["123.456.789-09", "", "abc", "12 34", "111.111.111-11"] {
            assert_eq!(normalize(&normalize(s)), normalize(s));
        }
    }

    #[test]
    fn test_format_canonical() {
        assert_eq!(format("12345678909"), "123.456.789-09");
        assert_eq!(format("123.456.789-09"), "123.456.789-09");
    }

    #[test]
    fn test_format_is_lenient_on_short_input() {
        assert_eq!(format(""), "..-");
        assert_eq!(format("123"), "123..-");
        assert_eq!(format("1234567"), "123.456.7-");
    }

    #[test]
    fn test_format_is_lenient_on_long_input() {
        assert_eq!(format("123456789012"), "123.456.789-012");
    }

    /// Generate a checksum-valid CPF digit string from a random 9-digit prefix
    fn random_valid_cpf(rng: &mut impl Rng) -> Vec<u32> {
        loop {
            let mut d: Vec<u32> = (0..9).map(|_| rng.gen_range(0..10)).collect();
            let v1 = super::verifier_digit(&d[..9], 10);
            d.push(v1);
            let v2 = super::verifier_digit(&d[..10], 11);
            d.push(v2);
            if !d.iter().all(|&x| x == d[0]) {
                return d;
            }
        }
    }

    fn digits_to_string(d: &[u32]) -> String {
        d.iter().map(|x| char::from_digit(*x, 10).unwrap()).collect()
    }

    /// Flipping one digit among positions 0..9 should almost always break
    /// validation. Mod-11 collisions are mathematically possible, so this is
    /// a statistical check over many samples rather than a strict invariant.
    #[test]
    fn test_single_digit_mutation_usually_invalidates() {
        let mut rng = rand::thread_rng();
        let mut mutations = 0u32;
        let mut survived = 0u32;

        for _ in 0..200 {
            let cpf = random_valid_cpf(&mut rng);
            assert!(is_valid(&digits_to_string(&cpf)));

            let pos = rng.gen_range(0..9);
            let bump = rng.gen_range(1..10);
            let mut mutated = cpf.clone();
            mutated[pos] = (mutated[pos] + bump) % 10;

            mutations += 1;
            if is_valid(&digits_to_string(&mutated)) {
                survived += 1;
            }
        }

        // Collisions exist but must be rare
        assert!(
            survived * 10 < mutations,
            "{survived}/{mutations} single-digit mutations survived validation"
        );
    }
}
