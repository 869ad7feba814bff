use rand::Rng;

/// 生成4位数字验证码，范围 1000..=9999，不会出现前导零
pub fn generate_four_digit_code() -> String {
    let mut rng = rand::thread_rng();
    rng.gen_range(1000..=9999u32).to_string()
}
