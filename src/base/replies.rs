//! Default reply texts.
//!
//! Every reply the bot can send without consulting an external service lives here. Each one
//! can be overridden through configuration.

/// Sent when a user joins a channel the bot is in.
pub const WELCOME_MESSAGE: &str =
    "Welcome to Covid19Bot. How can I help you? You can ask me informational questions about COVID-19 and statistical question regarding the pandemic's spread.";

/// Sent when the top intent matches neither a location nor a dispatch category.
pub const UNRECOGNIZED_MESSAGE: &str = "Covid19Bot unrecognized you, kindly type a question as what is the symptoms of covid19.";

/// Sent when the statistics model was selected but its intent has no known location.
pub const UNRECOGNIZED_STATS_MESSAGE: &str = "Bot unrecognized your inputs, kindly reply as live covid19 status.";

/// Sent when the question-answering service has nothing to say.
pub const QNA_NO_ANSWER_MESSAGE: &str = "Sorry, could not find an answer in the Q and A system.";

/// Sent when the statistics were fetched but the location is missing from them.
pub const DATA_UNAVAILABLE_MESSAGE: &str = "Sorry, live statistics for that location are not available right now.";

/// Sent when the statistics service could not be reached in time or returned garbage.
pub const FETCH_ERROR_MESSAGE: &str = "Sorry, I could not reach the COVID-19 statistics service. Please try again in a moment.";

/// Sent when the recognizer or the question-answering service failed.
pub const SERVICE_ERROR_MESSAGE: &str = "Sorry, something went wrong while handling your message. Please try again.";
