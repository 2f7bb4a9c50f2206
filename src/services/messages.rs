//! 机器人回复文案

pub fn welcome(bot_username: &str) -> String {
    format!(
        "Welcome to Link Tracker Bot! 👋🏻

Share any URL you'd like to track, and I'll provide you with a unique link that redirects to it. I'll notify you whenever someone clicks on it! 📮

Send your URL now! 🚀

Or

Use as inline bot by typing @{} and then your URL. 🌐",
        bot_username
    )
}

pub fn tracking_url_success(tracking_url: &str) -> String {
    format!("✅ Here is your tracking url:\n\n`{}`", tracking_url)
}

pub const INVALID_URL: &str = "This is not a valid URL.";
pub const ERROR_CREATING_LINK: &str =
    "An error occurred while creating the tracking link. Please try again later.";

pub const INLINE_INVALID_TITLE: &str = "Invalid URL ❌";
pub const INLINE_INVALID_DESC: &str = "Write a valid URL";
pub const INLINE_INVALID_TEXT: &str = "The url you entered is not valid. Please enter a valid URL.";
pub const INLINE_EXAMPLE_BUTTON: &str = "Example";
pub const INLINE_EXAMPLE_URL: &str = "https://google.com";

pub const INLINE_VALID_TITLE: &str = "Valid URL ✅";
pub const INLINE_VALID_DESC: &str = "Click to Send URL with wrapped link tracker";

pub const INLINE_ERROR_TITLE: &str = "Error ❌";
pub const INLINE_ERROR_DESC: &str = "An error occurred while creating the tracking link";
