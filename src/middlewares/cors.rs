use actix_cors::Cors;

pub fn create_cors() -> Cors {
    // 表单页面可能部署在任意域名下
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_any_header()
        .max_age(3600)
}
