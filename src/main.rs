use food_nutrient_api::{app, state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init(telemetry::SERVER_DIRECTIVES);

    // a store that cannot be reached at startup is fatal
    let app_state = AppState::init().await?;

    let router = app::build_app(app_state.clone());
    app::serve(router, app_state).await
}
