use std::{future::IntoFuture, path::Path, process, sync::Arc};

use axum::http::StatusCode;
use docgen::{
    application::{
        documents::{DocumentService, DocumentSettings},
        error::{AppError, ErrorReport},
    },
    config,
    domain::template::TemplateDescriptor,
    infra::{
        docx::DocxMaterializer,
        error::InfraError,
        http::{self, ApiState, ServiceInfo, api::models::GenerateDocumentRequest},
        pdf::PlaceholderPdfConverter,
        telemetry,
    },
};
use serde_json::Value;
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let chain = ErrorReport::from_error("main", StatusCode::INTERNAL_SERVER_ERROR, error).messages;

    if dispatcher::has_been_set() {
        error!(error = %error, chain = ?chain, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, chain = ?chain, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli().map_err(InfraError::from)?;

    let command = cli_args.command.unwrap_or(config::Command::Serve);

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let documents = Arc::new(build_document_service(&settings));

    match command {
        config::Command::Serve => run_serve(settings, documents).await,
        config::Command::Generate(args) => run_generate(documents, args).await,
    }
}

fn build_document_service(settings: &config::Settings) -> DocumentService {
    DocumentService::new(
        Arc::new(DocxMaterializer::new()),
        Arc::new(PlaceholderPdfConverter),
        DocumentSettings::from(settings),
    )
}

async fn run_serve(
    settings: config::Settings,
    documents: Arc<DocumentService>,
) -> Result<(), AppError> {
    let info = ServiceInfo::new(
        settings.deployment.environment.clone(),
        settings.frontend.url.clone(),
    );
    let state = ApiState {
        documents,
        info: Arc::new(info),
    };
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "docgen::serve",
        addr = %settings.server.addr,
        environment = %settings.deployment.environment,
        hosted = settings.deployment.hosted,
        scratch_dir = %settings.documents.scratch_dir.display(),
        "Listening"
    );

    let signalled = Arc::new(Notify::new());
    let trigger = signalled.clone();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            trigger.notify_one();
        })
        .into_future();

    let grace = settings.server.graceful_shutdown;
    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = async {
            signalled.notified().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(
                target = "docgen::serve",
                grace_secs = grace.as_secs(),
                "Graceful shutdown timed out; dropping open connections"
            );
        }
    }

    info!(target = "docgen::serve", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target = "docgen::serve", error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(target = "docgen::serve", error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!(target = "docgen::serve", "Shutdown signal received");
}

async fn run_generate(
    documents: Arc<DocumentService>,
    args: config::GenerateArgs,
) -> Result<(), AppError> {
    let (template, data) = read_request(&args.request).await?;
    let ctx = documents.context();

    let output = if args.structured {
        documents.write_structured(&template, &data, &args.output, &ctx)?
    } else {
        let Value::Object(fields) = data else {
            return Err(AppError::validation(
                "data must be a JSON object of field values",
            ));
        };
        let document = documents.generate_form(&template, &fields, &ctx)?;
        if let Some(parent) = args
            .output
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| AppError::from(InfraError::from(err)))?;
        }
        tokio::fs::write(&args.output, &document.bytes)
            .await
            .map_err(|err| AppError::from(InfraError::from(err)))?;
        args.output.clone()
    };

    info!(
        target = "docgen::generate",
        structured = args.structured,
        path = %output.display(),
        "Document generated"
    );
    Ok(())
}

async fn read_request(path: &Path) -> Result<(TemplateDescriptor, Value), AppError> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let request: GenerateDocumentRequest = serde_json::from_slice(&raw).map_err(|err| {
        AppError::validation(format!("invalid request file {}: {err}", path.display()))
    })?;

    match request {
        GenerateDocumentRequest {
            template: Some(template),
            data: Some(data),
        } => Ok((template, data)),
        _ => Err(AppError::validation(
            "request file must contain both `template` and `data`",
        )),
    }
}
