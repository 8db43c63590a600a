pub mod html;

pub use html::{escape_html, render_inquiry_thanks, render_report_page};
