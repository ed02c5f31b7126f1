use axum::{response::Html, routing::get, Router};

use crate::extraction::SUPPORTED_EXTENSIONS;

pub fn router() -> Router {
    Router::new().route("/", get(index))
}

async fn index() -> Html<String> {
    let accept = SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",");
    Html(PAGE.replace("{{accept}}", &accept))
}

const PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Data Analyst Agent</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 2rem; color: #1d1d1f; }
    h1 { margin-bottom: 0.5rem; }
    .card { border: 1px solid #ddd; padding: 1rem; border-radius: 8px; margin-bottom: 1rem; }
    label { display: block; margin-top: 0.75rem; font-weight: 600; }
    input[type=text], textarea { width: 100%; padding: 0.5rem; box-sizing: border-box; }
    button { margin-top: 1rem; padding: 0.6rem 1rem; }
    table { border-collapse: collapse; font-size: 0.9rem; }
    th, td { border: 1px solid #ddd; padding: 0.25rem 0.5rem; text-align: right; }
    .table-wrap { max-height: 400px; overflow: auto; }
    .answer { background: #e9f7ef; padding: 1rem; border-radius: 6px; white-space: pre-wrap; }
    .error { background: #fdecea; padding: 1rem; border-radius: 6px; }
    .warning { background: #fff4e5; padding: 0.75rem; border-radius: 6px; margin-top: 0.5rem; }
    .hidden { display: none; }
    #chart img { max-width: 100%; }
    ul.samples li { cursor: pointer; color: #0b5cad; }
  </style>
</head>
<body>
  <h1>Data Analyst Agent</h1>
  <p>Upload a file (CSV, Excel, PDF, DOCX, TXT, Image) and ask questions about its data.</p>

  <div class="card">
    <h2>Upload your document</h2>
    <input id="fileInput" type="file" accept="{{accept}}" />
    <div id="uploadStatus"></div>
  </div>

  <div class="card hidden" id="previewCard">
    <h2>Extracted Data Preview</h2>
    <div id="preview"></div>
  </div>

  <div class="card">
    <h2>Ask a question about the data</h2>
    <input id="question" type="text" placeholder="Which region had the highest total revenue?" />
    <button id="askBtn">Ask</button>
    <p>Sample prompts:</p>
    <ul class="samples">
      <li>What is the most sold item? Give a direct answer.</li>
      <li>Which region had the highest total revenue? Just the region name.</li>
      <li>Summarize the sales performance in one line.</li>
      <li>What is the total revenue from electronics?</li>
      <li>Which item type generated the least revenue?</li>
      <li>Tell me the month with the highest sales, answer directly.</li>
    </ul>
    <p><small>Tip: adding "Give a direct answer" or "Do not include code" keeps answers short.
      Mention "pie chart", "bar chart" or "line chart" to get a chart.</small></p>
  </div>

  <div class="card hidden" id="resultCard">
    <div id="answer"></div>
    <div id="warnings"></div>
    <div id="chart"></div>
  </div>

  <script>
    const fileInput = document.getElementById('fileInput');
    const uploadStatus = document.getElementById('uploadStatus');
    const previewCard = document.getElementById('previewCard');
    const preview = document.getElementById('preview');
    const resultCard = document.getElementById('resultCard');
    const answerBox = document.getElementById('answer');
    const warningsBox = document.getElementById('warnings');
    const chartBox = document.getElementById('chart');

    async function analyze(question) {
      const formData = new FormData();
      formData.append('file', fileInput.files[0]);
      if (question) {
        formData.append('question', question);
      }
      const res = await fetch('/api/analyze', { method: 'POST', body: formData });
      const json = await res.json();
      if (!res.ok) {
        throw new Error(json.message || res.statusText);
      }
      return json;
    }

    function showPreview(data) {
      previewCard.classList.remove('hidden');
      preview.replaceChildren();
      if (data.kind === 'table') {
        const wrap = document.createElement('div');
        wrap.className = 'table-wrap';
        const table = document.createElement('table');
        const head = table.insertRow();
        head.appendChild(document.createElement('th'));
        data.columns.forEach(c => {
          const th = document.createElement('th');
          th.textContent = c;
          head.appendChild(th);
        });
        data.rows.forEach((row, i) => {
          const tr = table.insertRow();
          const idx = document.createElement('th');
          idx.textContent = i;
          tr.appendChild(idx);
          row.forEach(v => { tr.insertCell().textContent = v; });
        });
        wrap.appendChild(table);
        preview.appendChild(wrap);
      } else {
        const area = document.createElement('textarea');
        area.rows = 14;
        area.readOnly = true;
        area.value = data.text;
        preview.appendChild(area);
      }
    }

    function showResult(json) {
      resultCard.classList.remove('hidden');
      answerBox.replaceChildren();
      warningsBox.replaceChildren();
      chartBox.replaceChildren();
      if (json.answer) {
        const div = document.createElement('div');
        div.className = json.answer.status === 'ok' ? 'answer' : 'error';
        div.textContent = json.answer.text;
        answerBox.appendChild(div);
      }
      (json.warnings || []).forEach(w => {
        const div = document.createElement('div');
        div.className = 'warning';
        div.textContent = w;
        warningsBox.appendChild(div);
      });
      if (json.chart) {
        const img = document.createElement('img');
        img.alt = json.chart.title;
        img.src = 'data:image/svg+xml;charset=utf-8,' + encodeURIComponent(json.chart.svg);
        chartBox.appendChild(img);
      }
    }

    fileInput.addEventListener('change', async () => {
      if (!fileInput.files.length) {
        return;
      }
      uploadStatus.textContent = 'Extracting...';
      resultCard.classList.add('hidden');
      try {
        const json = await analyze(null);
        uploadStatus.textContent = '';
        showPreview(json.preview);
      } catch (e) {
        uploadStatus.textContent = e.message;
        previewCard.classList.add('hidden');
      }
    });

    document.getElementById('askBtn').addEventListener('click', async () => {
      const question = document.getElementById('question').value.trim();
      if (!fileInput.files.length || !question) {
        uploadStatus.textContent = 'Select a file and enter a question first.';
        return;
      }
      answerBox.textContent = 'Thinking...';
      resultCard.classList.remove('hidden');
      try {
        const json = await analyze(question);
        showPreview(json.preview);
        showResult(json);
      } catch (e) {
        answerBox.textContent = e.message;
      }
    });

    document.querySelectorAll('ul.samples li').forEach(li => {
      li.addEventListener('click', () => {
        document.getElementById('question').value = li.textContent;
      });
    });
  </script>
</body>
</html>"#;

