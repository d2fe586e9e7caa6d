use helion_core::{ClientConfig, Controller, ModelId};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Reads HELION_API_URL / HELION_TIMEOUT_SECS, defaults to http://127.0.0.1:8000
    let config = ClientConfig::from_env()?;
    println!("Using inference API at {}", config.base_url());
    let mut app = Controller::connect(config)?;

    // Asking for a prediction before choosing a model is rejected locally
    match app.predict_next() {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Rejected without a request: {e}"),
    }

    // An unknown identifier is rejected too
    if let Err(e) = app.session_mut().select_model_by_name("gru7") {
        println!("{e}");
    }

    // 'lstm3' locks the input window to 3 events
    app.session_mut().select_model(ModelId::Lstm3)?;
    match app.session_mut().set_sequence_length(5) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{e}"),
    }

    // Fill the three starting events
    let events = ["login", "view_item", "add_to_cart"];
    for (index, event) in events.into_iter().enumerate() {
        app.session_mut().set_token(index, event)?;
    }

    // Each prediction slides into the window and feeds the next request.
    // Failures are kept in the history and the same window is retried.
    for _ in 0..5 {
        let label = app.session().button_label();
        match app.predict_next() {
            Ok(entry) => println!("[{label}] {entry}"),
            Err(e) => println!("[{label}] {e}"),
        }
        println!("    window: {:?}", app.session().window().tokens());
    }

    println!("History:");
    for entry in app.session().history().entries() {
        println!("    {entry}");
    }

    app.reset();
    println!("After reset: status {}, {} entries", app.session().status(), app.session().history().len());

    Ok(())
}
