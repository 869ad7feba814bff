use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use admission_backend::{
    config::Config,
    external::{MessagingClient, SheetClient},
    handlers,
    middlewares::create_cors,
    services::*,
    swagger::swagger_config,
    tasks,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration");

    for name in config.missing_required() {
        log::error!("Missing required configuration value: {name}");
    }

    // 创建外部服务
    let messaging_client =
        MessagingClient::new(config.messaging.clone()).expect("Failed to build messaging client");
    let sheet_client = SheetClient::new(config.sheet.clone()).expect("Failed to build sheet client");

    // 创建服务
    let otp_store = OtpStore::new(config.otp.max_entries);
    let otp_service = OtpService::new(
        otp_store.clone(),
        Arc::new(messaging_client),
        config.otp.ttl(),
    );
    let submission_service =
        SubmissionService::new(Arc::new(sheet_client), config.upload.max_file_bytes);

    tasks::spawn_all(otp_store, config.otp.sweep_interval());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(handlers::json_config())
            .app_data(web::Data::new(otp_service.clone()))
            .app_data(web::Data::new(submission_service.clone()))
            .configure(swagger_config)
            .configure(handlers::health_config)
            .configure(handlers::otp_config)
            .configure(handlers::form_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
