use aws_config::{BehaviorVersion, Region};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use toll_report::utils::{logger, validation::Validate};
use toll_report::{
    DynamoCredentialStore, EtlEngine, LambdaConfig, S3Storage, StorageSink, TollReportPipeline,
};

#[derive(Deserialize)]
pub struct Request {
    #[serde(rename = "requestContext")]
    pub request_context: RequestContext,
}

#[derive(Deserialize)]
pub struct RequestContext {
    pub body: RequestBody,
}

#[derive(Deserialize)]
pub struct RequestBody {
    pub sender: String,
}

#[derive(Serialize)]
pub struct Response {
    pub message: String,
    pub period_start: String,
    pub period_end: String,
    pub transactions: usize,
    pub total: String,
    pub output_location: String,
}

async fn function_handler(event: LambdaEvent<Request>) -> Result<Response, Error> {
    let sender = event.payload.request_context.body.sender;
    tracing::info!("Toll report requested by {}", sender);

    let lambda_config = LambdaConfig::from_env()?;
    lambda_config.validate()?;

    let aws = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(lambda_config.region.clone()))
        .timeout_config(lambda_config.aws_timeout_config())
        .load()
        .await;
    let s3_client = aws_sdk_s3::Client::new(&aws);
    let dynamo_client = aws_sdk_dynamodb::Client::new(&aws);

    let report = lambda_config.report;
    let credentials = DynamoCredentialStore::new(dynamo_client, lambda_config.credentials_table);
    let sink = StorageSink::new(
        S3Storage::new(s3_client.clone()),
        report.output.bucket.clone(),
        report.output.prefix.clone(),
    );
    let pipeline = TollReportPipeline::new(credentials, S3Storage::new(s3_client), sink, report)?;

    let summary = EtlEngine::new(pipeline).run(&sender).await.map_err(|e| {
        tracing::error!(
            category = ?e.category(),
            retryable = e.is_retryable(),
            "Toll report failed: {}",
            e
        );
        e
    })?;

    Ok(Response {
        message: "Toll report completed successfully".to_string(),
        period_start: summary.range.start().to_string(),
        period_end: summary.range.end().to_string(),
        transactions: summary.transactions,
        total: summary.total.to_string(),
        output_location: summary.output_location,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();
    run(service_fn(function_handler)).await
}
