//! Static page bodies.

pub const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>Users API</title>
  </head>
  <body>
    <h1>Welcome to the Users API</h1>
    <p>Server is running without a web framework!</p>
    <ul>
      <li><a href="/api/users">GET /api/users</a></li>
      <li><a href="/api/health">GET /api/health</a></li>
      <li><a href="/about">GET /about</a></li>
      <li><a href="/contacts">GET /contacts</a></li>
    </ul>
  </body>
</html>
"#;

pub const ABOUT_TEXT: &str = "This is an HTTP server built without a web framework.";
