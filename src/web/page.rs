//! HTML form page

const HEAD: &str = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Remove Guitar (Demucs)</title>
    <style>
      body { font-family: Arial, sans-serif; margin: 40px; }
      .card { max-width: 720px; padding: 24px; border: 1px solid #ddd; border-radius: 8px; }
      .row { margin-top: 18px; }
      audio { width: 100%; }
      .error { color: #b00020; }
    </style>
  </head>
  <body>
    <div class="card">
      <h2>Remove Guitar (Approx)</h2>
      <p>This mixes drums + bass + vocals from Demucs to reduce guitar.</p>
      <form method="post" enctype="multipart/form-data">
        <input type="file" name="audio_file" accept="audio/*" required>
        <button type="submit">Process</button>
      </form>
"#;

const TAIL: &str = r#"    </div>
  </body>
</html>
"#;

/// State shown below the upload form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageView {
    pub error: Option<String>,
    pub original_url: Option<String>,
    pub output_url: Option<String>,
}

impl PageView {
    pub fn form() -> Self {
        Self::default()
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self { error: Some(message.into()), ..Default::default() }
    }

    pub fn result<O: Into<String>, P: Into<String>>(original_url: O, output_url: P) -> Self {
        Self {
            error: None,
            original_url: Some(original_url.into()),
            output_url: Some(output_url.into()),
        }
    }

    pub fn render(&self) -> String {
        let mut html = String::from(HEAD);

        if let Some(error) = &self.error {
            html.push_str(&format!("      <div class=\"row error\">{}</div>\n", escape_html(error)));
        }

        // Players only when both sides are present
        if let (Some(original), Some(output)) = (&self.original_url, &self.output_url) {
            html.push_str(&player("Original", original));
            html.push_str(&player("No Guitar (Approx)", output));
        }

        html.push_str(TAIL);
        html
    }
}

fn player(label: &str, url: &str) -> String {
    format!(
        "      <div class=\"row\">\n        <strong>{}</strong>\n        <audio controls src=\"{}\"></audio>\n      </div>\n",
        label,
        escape_html(url)
    )
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
