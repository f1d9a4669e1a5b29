mod helpers;

mod api_client;
mod telemetry;
