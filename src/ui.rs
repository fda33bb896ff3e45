use crate::models::{DashboardView, ItemView, Mode, Status};

pub fn render_index(view: &DashboardView) -> String {
    let upcoming = if view.upcoming.is_empty() {
        r#"<li class="empty">Nothing due. Enjoy it.</li>"#.to_string()
    } else {
        view.upcoming.iter().map(render_upcoming).collect()
    };
    let items = if view.items.is_empty() {
        r#"<li class="empty">No items yet.</li>"#.to_string()
    } else {
        view.items.iter().map(render_item).collect()
    };

    INDEX_HTML
        .replace("{{MODE}}", view.mode.as_str())
        .replace("{{PERSONAL_ACTIVE}}", active_class(view.mode == Mode::Personal))
        .replace("{{BUSINESS_ACTIVE}}", active_class(view.mode == Mode::Business))
        .replace("{{TOTAL}}", &view.monthly_total)
        .replace("{{UPCOMING}}", &upcoming)
        .replace("{{ITEMS}}", &items)
}

fn active_class(active: bool) -> &'static str {
    if active { "mode-btn active" } else { "mode-btn" }
}

fn render_amount(item: &ItemView) -> String {
    item.amount
        .map(|amount| format!(r#"<span class="item-amount">${amount:.2}</span>"#))
        .unwrap_or_default()
}

fn render_upcoming(item: &ItemView) -> String {
    format!(
        r#"<li><span class="item-title">{title}</span><span class="item-due">{due}</span>{amount}</li>"#,
        title = escape_html(&item.title),
        due = item.due_label,
        amount = render_amount(item),
    )
}

fn render_item(item: &ItemView) -> String {
    let id = escape_html(&item.id);
    let recurring = item
        .recurring
        .map(|period| format!(r#"<span class="item-tag">{}</span>"#, period.as_str()))
        .unwrap_or_default();
    let done_button = if item.status == Status::Upcoming {
        format!(
            r#"<form method="post" action="/items/{id}/done"><button class="mark-done" type="submit" title="Mark done">&#10004;</button></form>"#
        )
    } else {
        String::new()
    };

    format!(
        r#"<li class="item-{kind}">
  <span class="item-title">{title}</span>
  <span class="item-due">{due}</span>
  {amount}{recurring}
  <span class="status-{status}">{status}</span>
  {done_button}
  <form method="post" action="/items/{id}/delete"><button class="delete-item" type="submit" title="Delete">&#128465;</button></form>
</li>"#,
        kind = item.kind.as_str(),
        title = escape_html(&item.title),
        due = item.due_label,
        amount = render_amount(item),
        status = item.status.as_str(),
    )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub const SERVICE_WORKER_JS: &str = r#"const CACHE = 'clario-v1';
const SHELL = ['/'];

self.addEventListener('install', (event) => {
  event.waitUntil(caches.open(CACHE).then((cache) => cache.addAll(SHELL)));
});

self.addEventListener('activate', (event) => {
  event.waitUntil(
    caches.keys().then((keys) =>
      Promise.all(keys.filter((key) => key !== CACHE).map((key) => caches.delete(key)))
    )
  );
});

self.addEventListener('fetch', (event) => {
  if (event.request.method !== 'GET') {
    return;
  }
  event.respondWith(
    fetch(event.request)
      .then((response) => {
        const copy = response.clone();
        caches.open(CACHE).then((cache) => cache.put(event.request, copy));
        return response;
      })
      .catch(() => caches.match(event.request))
  );
});
"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Clario</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef3f1;
      --bg-2: #c9e4d6;
      --ink: #1f2a2e;
      --accent: #2f8f6b;
      --accent-2: #2f4858;
      --danger: #c2553f;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #f4faf7 70%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: center;
      flex-wrap: wrap;
      gap: 12px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    h2 {
      margin: 0 0 10px;
      font-size: 1.1rem;
    }

    .modes {
      display: flex;
      gap: 8px;
    }

    .mode-btn, .primary, .secondary {
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font: inherit;
      cursor: pointer;
      background: #e3ece8;
      color: var(--ink);
    }

    .mode-btn.active, .primary {
      background: var(--accent);
      color: #fff;
    }

    .total {
      font-size: 1.4rem;
      font-weight: 600;
    }

    ul {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 8px;
    }

    li {
      display: flex;
      align-items: center;
      gap: 12px;
      padding: 10px 14px;
      border-radius: 14px;
      background: #f6faf8;
    }

    li.empty {
      color: #6b7a75;
    }

    li form {
      margin: 0;
    }

    .item-title {
      flex: 1;
      font-weight: 500;
    }

    .item-due, .item-tag {
      color: #5c6b66;
      font-size: 0.9rem;
    }

    .item-amount {
      font-weight: 600;
    }

    .status-done {
      color: var(--accent);
    }

    .status-upcoming {
      color: var(--accent-2);
    }

    .mark-done, .delete-item {
      border: none;
      background: transparent;
      cursor: pointer;
      font-size: 1rem;
    }

    .delete-item {
      color: var(--danger);
    }

    #add-item-form {
      display: none;
    }

    #add-item-form.show {
      display: block;
    }

    #item-form {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 12px;
    }

    label {
      display: grid;
      gap: 4px;
      font-size: 0.9rem;
    }

    input, select {
      font: inherit;
      padding: 8px 10px;
      border-radius: 10px;
      border: 1px solid #c8d6d0;
    }

    .form-actions {
      display: flex;
      gap: 8px;
      align-items: end;
    }
  </style>
</head>
<body>
  <main class="app" data-mode="{{MODE}}">
    <header>
      <h1>Clario</h1>
      <div class="modes">
        <form method="post" action="/mode/personal"><button id="personal-mode" class="{{PERSONAL_ACTIVE}}" type="submit">Personal</button></form>
        <form method="post" action="/mode/business"><button id="business-mode" class="{{BUSINESS_ACTIVE}}" type="submit">Business</button></form>
      </div>
    </header>

    <section>
      <h2>Monthly total</h2>
      <span class="total">$<span id="monthly-total">{{TOTAL}}</span></span>
    </section>

    <section>
      <h2>Upcoming</h2>
      <ul id="upcoming-list">{{UPCOMING}}</ul>
    </section>

    <section>
      <button id="add-item-btn" class="primary" type="button">Add item</button>
      <div id="add-item-form">
        <form id="item-form" method="post" action="/items">
          <label>Title <input id="item-title" name="title" required /></label>
          <label>Type
            <select id="item-type" name="type">
              <option value="task">Task</option>
              <option value="payment">Payment</option>
            </select>
          </label>
          <label>Due date <input id="item-due-date" name="dueDate" type="date" required /></label>
          <label id="amount-label" style="display: none">Amount <input id="item-amount" name="amount" type="number" step="0.01" min="0" /></label>
          <label>Repeats
            <select id="item-recurring" name="recurring">
              <option value="">Never</option>
              <option value="daily">Daily</option>
              <option value="weekly">Weekly</option>
              <option value="monthly">Monthly</option>
              <option value="yearly">Yearly</option>
            </select>
          </label>
          <label>Mode
            <select id="item-mode" name="mode">
              <option value="personal">Personal</option>
              <option value="business">Business</option>
            </select>
          </label>
          <label><span><input id="item-reminder" name="reminder" type="checkbox" /> Remind me</span></label>
          <div class="form-actions">
            <button class="primary" type="submit">Save</button>
            <button id="cancel-item" class="secondary" type="button">Cancel</button>
          </div>
        </form>
      </div>
    </section>

    <section>
      <h2>All items</h2>
      <ul id="items-list">{{ITEMS}}</ul>
    </section>
  </main>

  <script>
    const formWrap = document.getElementById('add-item-form');
    const itemForm = document.getElementById('item-form');
    const typeSelect = document.getElementById('item-type');
    const amountLabel = document.getElementById('amount-label');
    const modeSelect = document.getElementById('item-mode');

    modeSelect.value = document.querySelector('.app').dataset.mode;

    document.getElementById('add-item-btn').addEventListener('click', () => {
      formWrap.classList.add('show');
    });

    document.getElementById('cancel-item').addEventListener('click', () => {
      formWrap.classList.remove('show');
      itemForm.reset();
      amountLabel.style.display = 'none';
    });

    typeSelect.addEventListener('change', () => {
      amountLabel.style.display = typeSelect.value === 'payment' ? 'block' : 'none';
    });

    let lastSeq = Number(sessionStorage.getItem('clarioNotificationSeq') || 0);

    const pollNotifications = async () => {
      if (!('Notification' in window) || Notification.permission !== 'granted') {
        return;
      }
      try {
        const response = await fetch(`/api/notifications?after=${lastSeq}`);
        if (!response.ok) {
          return;
        }
        const fired = await response.json();
        fired.forEach((entry) => {
          new Notification(entry.title, { body: entry.body });
          lastSeq = Math.max(lastSeq, entry.seq);
        });
        sessionStorage.setItem('clarioNotificationSeq', String(lastSeq));
      } catch (err) {
        // offline; try again on the next poll
      }
    };

    if ('Notification' in window && Notification.permission === 'default') {
      Notification.requestPermission();
    }

    if ('serviceWorker' in navigator) {
      navigator.serviceWorker.register('/service-worker.js').catch(() => {});
    }

    pollNotifications();
    setInterval(pollNotifications, 60 * 1000);
  </script>
</body>
</html>
"#;
