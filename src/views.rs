//! HTML rendering for the two pages of the app.
//!
//! Styling lives in a [`ViewConfig`] value handed to [`render_page`]; the
//! renderer keeps no state of its own.

pub const NO_IMAGE_WARNING: &str = "Please upload an image first.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    pub title: String,
    pub tagline: String,
    pub primary_color: String,
    pub header_color: String,
    pub background: String,
    pub button_color: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            title: "Plant Disease Detection System".into(),
            tagline: "For Sustainable Agriculture".into(),
            primary_color: "#f875ed".into(),
            header_color: "#88C0D0".into(),
            background: "linear-gradient(135deg, rgb(32, 76, 199), rgb(18, 144, 16))".into(),
            button_color: "#245315".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    DiseaseRecognition,
}

impl Page {
    pub fn path(self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::DiseaseRecognition => "/recognition",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Page::Home => "HOME",
            Page::DiseaseRecognition => "DISEASE RECOGNITION",
        }
    }
}

/// Outcome message shown above the upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Warning(String),
    Error(String),
}

impl Banner {
    fn class(&self) -> &'static str {
        match self {
            Banner::Success(_) => "success",
            Banner::Warning(_) => "warning",
            Banner::Error(_) => "error",
        }
    }

    fn text(&self) -> &str {
        match self {
            Banner::Success(t) | Banner::Warning(t) | Banner::Error(t) => t,
        }
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn stylesheet(config: &ViewConfig) -> String {
    format!(
        "body {{ background: {bg}; background-attachment: fixed; color: white; font-family: sans-serif; margin: 0; display: flex; }}\n\
         nav {{ width: 16rem; padding: 1rem; background: rgba(0, 0, 0, 0.25); min-height: 100vh; }}\n\
         nav a {{ display: block; color: white; margin: 0.5rem 0; }}\n\
         nav img {{ width: 100%; }}\n\
         main {{ flex: 1; padding: 2rem; }}\n\
         h1, h2 {{ color: {primary}; }}\n\
         h3 {{ color: {header}; text-align: center; }}\n\
         button {{ background-color: {button}; color: black; border-radius: 10px; padding: 10px 20px; border: none; font-weight: bold; }}\n\
         .success {{ background: #1b5e20; padding: 0.75rem; }}\n\
         .warning {{ background: #8d6e00; padding: 0.75rem; }}\n\
         .error {{ background: #8e1b1b; padding: 0.75rem; }}",
        bg = config.background,
        primary = config.primary_color,
        header = config.header_color,
        button = config.button_color,
    )
}

fn nav(title: &str) -> String {
    let links: String = [Page::Home, Page::DiseaseRecognition]
        .iter()
        .map(|target| format!("<a href=\"{}\">{}</a>\n", target.path(), target.name()))
        .collect();
    format!(
        "<nav>\n<h2>{}</h2>\n{}<img src=\"/assets/sidebar\" alt=\"Plant diseases\">\n</nav>\n",
        title, links
    )
}

fn home_body(config: &ViewConfig, title: &str) -> String {
    format!(
        "<h1>Welcome to the {title}</h1>\n<h3>{tagline}</h3>\n\
         <p>Use this tool to detect plant diseases quickly. Upload an image of your plant \
         and the model will predict the potential disease.</p>\n\
         <p><a href=\"{link}\">Go to disease recognition</a></p>\n",
        title = title,
        tagline = escape_html(&config.tagline),
        link = Page::DiseaseRecognition.path(),
    )
}

fn recognition_body(banner: Option<&Banner>) -> String {
    let banner = banner
        .map(|b| format!("<div class=\"{}\">{}</div>\n", b.class(), escape_html(b.text())))
        .unwrap_or_default();
    format!(
        "<h1>Plant Disease Recognition</h1>\n<h3>Upload Your Plant Image Below</h3>\n{banner}\
         <form method=\"post\" action=\"{action}\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"image\" accept=\".jpg,.jpeg,.png\">\n\
         <button type=\"submit\">Predict Disease</button>\n</form>\n",
        banner = banner,
        action = Page::DiseaseRecognition.path(),
    )
}

/// Render a full HTML document for `page`, with an optional outcome banner.
pub fn render_page(config: &ViewConfig, page: Page, banner: Option<&Banner>) -> String {
    let title = escape_html(&config.title);
    let body = match page {
        Page::Home => home_body(config, &title),
        Page::DiseaseRecognition => recognition_body(banner),
    };

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>\n{css}\n</style>\n</head>\n<body>\n{nav}<main>\n{body}</main>\n</body>\n</html>\n",
        title = title,
        css = stylesheet(config),
        nav = nav(&title),
        body = body,
    )
}
