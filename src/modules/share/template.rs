use askama::Template;

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>dropcode</title>
    <style>
      body{font-family:system-ui,sans-serif;background:#fafafa;color:#111}
      main{max-width:560px;margin:4rem auto;text-align:center}
      section{margin:2rem 0;padding:1.5rem;border:1px solid #ddd;border-radius:8px;background:#fff}
      input,button{display:block;margin:0.6rem auto}
      #result img{width:200px;height:200px}
      .error{color:#b00020}
    </style>
  </head>
  <body>
    <main>
      <h1>dropcode</h1>
      <section>
        <h2>Send</h2>
        <form id="upload-form">
          <input type="file" name="files" multiple>
          <button type="submit">Upload</button>
        </form>
        <p>Up to {{ max_size }} in total. Files are deleted after {{ expiry_minutes }} minutes.</p>
        <div id="result"></div>
      </section>
      <section>
        <h2>Receive</h2>
        <form id="code-form">
          <input type="text" name="code" inputmode="numeric" placeholder="6-digit code">
          <button type="submit">Get file</button>
        </form>
        <div id="lookup"></div>
      </section>
    </main>
    {% raw %}
    <script>
      const show = (el, html) => { document.getElementById(el).innerHTML = html; };
      const fail = (el, msg) => {
        show(el, '<p class="error"></p>');
        document.querySelector('#' + el + ' .error').textContent = msg;
      };

      document.getElementById('upload-form').addEventListener('submit', async (ev) => {
        ev.preventDefault();
        const res = await fetch('/upload', { method: 'POST', body: new FormData(ev.target) });
        const data = await res.json();
        if (data.error) { fail('result', data.error); return; }
        show('result',
          '<p>Code: <strong>' + data.code + '</strong> (' + data.files + ' file(s))</p>' +
          '<p><a href="' + data.link + '">' + data.link + '</a></p>' +
          '<img alt="QR code" src="' + data.qr + '">');
      });

      document.getElementById('code-form').addEventListener('submit', async (ev) => {
        ev.preventDefault();
        const res = await fetch('/getfile', { method: 'POST', body: new URLSearchParams(new FormData(ev.target)) });
        const data = await res.json();
        if (data.error) { fail('lookup', data.error); return; }
        window.location.href = data.link;
      });
    </script>
    {% endraw %}
  </body>
</html>"#,
    ext = "html"
)]
pub struct IndexTemplate {
    pub max_size: String,
    pub expiry_minutes: i64,
}
