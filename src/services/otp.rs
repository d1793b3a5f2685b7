use rand::Rng;

pub(crate) const OTP_LENGTH: usize = 6;

/// Six decimal digits without a leading zero.
pub(crate) fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000u32).to_string()
}

/// Compares codes without short-circuiting on the first differing digit.
pub(crate) fn otp_matches(expected: &str, provided: &str) -> bool {
    let provided = provided.trim();
    if expected.len() != provided.len() {
        return false;
    }

    expected.bytes().zip(provided.bytes()).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}
