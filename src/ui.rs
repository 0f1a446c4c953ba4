use crate::models::Snapshot;
use crate::resources::{self, DIRECTORY};

pub fn render_index(snapshot: &Snapshot) -> String {
    INDEX_HTML
        .replace("{{TODAY}}", &snapshot.today)
        .replace("{{CURRENT}}", &snapshot.streak.current_streak.to_string())
        .replace("{{LONGEST}}", &snapshot.streak.longest_streak.to_string())
        .replace("{{RESOURCES}}", &render_resources())
}

fn render_resources() -> String {
    let mut html = String::new();
    for category in resources::categories() {
        html.push_str(&format!(
            "<h3 class=\"resource-category\">{}</h3>\n<div class=\"resource-grid\">\n",
            escape(&category.replace('-', " "))
        ));
        for resource in DIRECTORY.iter().filter(|r| r.category == category) {
            html.push_str(&format!(
                "<button type=\"button\" class=\"resource-card\" data-url=\"{}\" data-category=\"{}\" data-name=\"{}\">\
                 <span class=\"resource-name\">{}</span><span class=\"resource-desc\">{}</span></button>\n",
                escape(resource.url),
                escape(resource.category),
                escape(resource.name),
                escape(resource.name),
                escape(resource.description),
            ));
        }
        html.push_str("</div>\n");
    }
    html
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Prop Trader Discipline</title>
  <style>
    :root {
      --bg: #1a2332;
      --panel: #223044;
      --ink: #e6edf5;
      --muted: #8ea0b5;
      --accent: #10b981;
      --danger: #ef4444;
      --line: rgba(255, 255, 255, 0.08);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      display: grid;
      place-items: start center;
      padding: 24px 12px;
    }

    .app {
      width: min(420px, 100%);
      background: var(--panel);
      border-radius: 16px;
      padding: 20px;
      display: grid;
      gap: 18px;
    }

    nav {
      display: flex;
      gap: 4px;
    }

    .nav-btn {
      flex: 1;
      background: transparent;
      color: var(--muted);
      border: 1px solid var(--line);
      border-radius: 8px;
      padding: 8px 4px;
      font-size: 0.8rem;
      cursor: pointer;
    }

    .nav-btn.active {
      color: var(--ink);
      border-color: var(--accent);
    }

    .tab-content {
      display: none;
      gap: 14px;
    }

    .tab-content.active {
      display: grid;
    }

    .streak-header {
      display: flex;
      justify-content: space-between;
      align-items: baseline;
    }

    .streak-count {
      font-size: 2.4rem;
      font-weight: 700;
      color: var(--accent);
    }

    .muted {
      color: var(--muted);
      font-size: 0.85rem;
    }

    .calendar-grid {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 6px;
    }

    .calendar-day {
      aspect-ratio: 1;
      display: grid;
      place-items: center;
      border-radius: 8px;
      border: 1px solid var(--line);
      font-size: 0.85rem;
    }

    .calendar-day.completed {
      background: var(--accent);
      color: #06281d;
    }

    .calendar-day.violated {
      background: var(--danger);
    }

    .calendar-day.current {
      border-color: var(--accent);
    }

    .checkin {
      display: grid;
      grid-template-columns: 1fr 1fr;
      gap: 8px;
    }

    button.primary,
    button.danger,
    button.plain {
      border: none;
      border-radius: 8px;
      padding: 10px;
      font-weight: 600;
      cursor: pointer;
      color: white;
    }

    button.primary {
      background: var(--accent);
    }

    button.danger {
      background: var(--danger);
    }

    button.plain {
      background: transparent;
      border: 1px solid var(--line);
      color: var(--ink);
    }

    button:disabled {
      opacity: 0.5;
      cursor: default;
    }

    .list {
      display: grid;
      gap: 6px;
    }

    .item {
      display: flex;
      gap: 8px;
      align-items: center;
      padding: 8px;
      border: 1px solid var(--line);
      border-radius: 8px;
      background: rgba(0, 0, 0, 0.12);
    }

    .item.dragging {
      opacity: 0.4;
    }

    .item .text {
      flex: 1;
    }

    .item input[type="text"] {
      flex: 1;
    }

    .drag-handle {
      cursor: grab;
      color: var(--muted);
    }

    .icon-btn {
      background: transparent;
      border: none;
      color: var(--muted);
      cursor: pointer;
    }

    .add-row {
      display: flex;
      gap: 6px;
    }

    input[type="text"],
    textarea {
      background: rgba(0, 0, 0, 0.2);
      border: 1px solid var(--line);
      border-radius: 8px;
      color: var(--ink);
      padding: 8px;
      font: inherit;
    }

    .add-row input {
      flex: 1;
    }

    .resource-category {
      margin: 6px 0 0;
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .resource-grid {
      display: grid;
      gap: 6px;
    }

    .resource-card {
      text-align: left;
      display: grid;
      gap: 2px;
      padding: 10px;
      border-radius: 8px;
      border: 1px solid var(--line);
      background: rgba(0, 0, 0, 0.12);
      color: var(--ink);
      cursor: pointer;
    }

    .resource-desc {
      color: var(--muted);
      font-size: 0.8rem;
    }

    .overlay {
      position: fixed;
      inset: 0;
      background: rgba(0, 0, 0, 0.55);
    }

    .modal {
      position: fixed;
      left: 50%;
      top: 30%;
      transform: translate(-50%, -30%);
      width: min(380px, 92vw);
      background: var(--panel);
      border-radius: 12px;
      padding: 18px;
      display: grid;
      gap: 10px;
    }

    .hidden {
      display: none !important;
    }

    .status {
      min-height: 1.2em;
      font-size: 0.85rem;
      color: var(--muted);
    }

    .status[data-type="error"] {
      color: var(--danger);
    }
  </style>
</head>
<body>
  <main class="app">
    <nav>
      <button class="nav-btn active" data-tab="dashboard">Dashboard</button>
      <button class="nav-btn" data-tab="rules">Rules</button>
      <button class="nav-btn" data-tab="habits">Habits</button>
      <button class="nav-btn" data-tab="resources">Resources</button>
      <button class="nav-btn" data-tab="settings">Settings</button>
    </nav>

    <section id="dashboard" class="tab-content active">
      <div class="streak-header">
        <div>
          <div class="muted">Current streak</div>
          <div id="current-streak" class="streak-count">{{CURRENT}}</div>
        </div>
        <div class="muted">Longest: <span id="longest-count">{{LONGEST}}</span></div>
      </div>
      <div id="calendar-grid" class="calendar-grid"></div>
      <div class="checkin">
        <button id="followed-rules" class="primary" type="button">I followed my rules</button>
        <button id="violated-rule" class="danger" type="button">I broke a rule</button>
      </div>
      <div class="muted">Today: <span id="today">{{TODAY}}</span></div>
    </section>

    <section id="rules" class="tab-content">
      <div id="rules-list" class="list"></div>
      <p id="rules-empty" class="muted hidden">No rules yet. Write down the rules you trade by.</p>
      <form id="rule-form" class="add-row">
        <input id="rule-input" type="text" maxlength="100" placeholder="New trading rule" />
        <button class="primary" type="submit">Add</button>
      </form>
    </section>

    <section id="habits" class="tab-content">
      <div id="habits-list" class="list"></div>
      <form id="habit-form" class="add-row">
        <input id="habit-input" type="text" maxlength="100" placeholder="New daily habit" />
        <button class="primary" type="submit">Add</button>
      </form>
      <p class="muted">Habit check-marks clear every day at market close.</p>
    </section>

    <section id="resources" class="tab-content">
{{RESOURCES}}
    </section>

    <section id="settings" class="tab-content">
      <label class="item"><input id="analytics-enabled" type="checkbox" /> <span class="text">Record resource clicks locally</span></label>
      <label class="item"><input id="privacy-consent" type="checkbox" /> <span class="text">I have read the privacy note</span></label>
      <p class="muted">Click records never leave this machine. Only the newest 100 are kept.</p>
      <div id="analytics-summary" class="muted"></div>
    </section>

    <div id="status" class="status"></div>
  </main>

  <div id="overlay" class="overlay hidden"></div>
  <div id="violation-modal" class="modal hidden">
    <strong>Which rule did you break?</strong>
    <textarea id="violation-text" rows="3" placeholder="Describe what happened"></textarea>
    <div class="checkin">
      <button id="cancel-violation" class="plain" type="button">Cancel</button>
      <button id="reset-streak" class="danger" type="button">Reset streak</button>
    </div>
  </div>

  <script>
    const $ = (id) => document.getElementById(id);
    const statusEl = $('status');
    let state = null;

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const request = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: body ? { 'content-type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.json();
    };

    const renderCalendar = () => {
      const grid = $('calendar-grid');
      grid.innerHTML = '';
      state.streak.streakDays.forEach((status, i) => {
        const day = document.createElement('div');
        day.className = 'calendar-day';
        day.textContent = i + 1;
        if (status !== 'incomplete') {
          day.classList.add(status);
        } else if (i === state.streak.currentStreak) {
          day.classList.add('current');
        }
        grid.appendChild(day);
      });
      $('current-streak').textContent = state.streak.currentStreak;
      $('longest-count').textContent = state.streak.longestStreak;
      $('today').textContent = state.today;
      $('followed-rules').disabled = state.streak.checkedInToday;
    };

    const attachDrag = (el, index, kind) => {
      el.draggable = true;
      el.addEventListener('dragstart', (event) => {
        event.dataTransfer.setData('text/plain', String(index));
        el.classList.add('dragging');
      });
      el.addEventListener('dragend', () => el.classList.remove('dragging'));
      el.addEventListener('dragover', (event) => event.preventDefault());
      el.addEventListener('drop', (event) => {
        event.preventDefault();
        const from = Number(event.dataTransfer.getData('text/plain'));
        if (from !== index) {
          mutate('POST', `/api/${kind}/reorder`, { from, to: index });
        }
      });
    };

    const renderRules = () => {
      const list = $('rules-list');
      list.innerHTML = '';
      $('rules-empty').classList.toggle('hidden', state.rules.length > 0);
      state.rules.forEach((rule, index) => {
        const row = document.createElement('div');
        row.className = 'item';
        const handle = document.createElement('span');
        handle.className = 'drag-handle';
        handle.textContent = '≡';
        const text = document.createElement('span');
        text.className = 'text';
        text.textContent = rule.text;
        const edit = document.createElement('button');
        edit.className = 'icon-btn';
        edit.textContent = '✎';
        edit.title = 'Edit rule';
        edit.addEventListener('click', () => {
          const input = document.createElement('input');
          input.type = 'text';
          input.maxLength = 100;
          input.value = rule.text;
          input.addEventListener('keydown', (event) => {
            if (event.key === 'Enter') {
              mutate('PUT', `/api/rules/${encodeURIComponent(rule.id)}`, { text: input.value });
            } else if (event.key === 'Escape') {
              renderRules();
            }
          });
          row.replaceChild(input, text);
          input.focus();
        });
        const remove = document.createElement('button');
        remove.className = 'icon-btn';
        remove.textContent = '✕';
        remove.title = 'Delete rule';
        remove.addEventListener('click', () => mutate('DELETE', `/api/rules/${encodeURIComponent(rule.id)}`));
        row.append(handle, text, edit, remove);
        attachDrag(row, index, 'rules');
        list.appendChild(row);
      });
    };

    const renderHabits = () => {
      const list = $('habits-list');
      list.innerHTML = '';
      state.habits.forEach((habit, index) => {
        const row = document.createElement('label');
        row.className = 'item';
        const box = document.createElement('input');
        box.type = 'checkbox';
        box.checked = habit.completed;
        box.addEventListener('change', () =>
          mutate('PUT', `/api/habits/${encodeURIComponent(habit.id)}`, { completed: box.checked }));
        const text = document.createElement('span');
        text.className = 'text';
        text.textContent = habit.text;
        const remove = document.createElement('button');
        remove.className = 'icon-btn';
        remove.type = 'button';
        remove.textContent = '✕';
        remove.addEventListener('click', (event) => {
          event.preventDefault();
          mutate('DELETE', `/api/habits/${encodeURIComponent(habit.id)}`);
        });
        row.append(box, text, remove);
        attachDrag(row, index, 'habits');
        list.appendChild(row);
      });
    };

    const renderSettings = () => {
      $('analytics-enabled').checked = state.settings.analyticsEnabled;
      $('privacy-consent').checked = state.settings.privacyConsent;
      request('GET', '/api/resources/analytics')
        .then((a) => {
          $('analytics-summary').textContent = `${a.totalClicks} clicks recorded`;
        })
        .catch(() => {});
    };

    const renderers = {
      calendar: renderCalendar,
      rules: renderRules,
      habits: renderHabits,
      settings: renderSettings
    };

    const apply = (response) => {
      state = response;
      (response.refresh || Object.keys(renderers)).forEach((section) => renderers[section]());
    };

    const mutate = (method, url, body) =>
      request(method, url, body)
        .then((response) => {
          apply(response);
          setStatus('', '');
        })
        .catch((err) => setStatus(err.message, 'error'));

    const showViolationModal = () => {
      $('violation-text').value = '';
      $('violation-modal').classList.remove('hidden');
      $('overlay').classList.remove('hidden');
      $('violation-text').focus();
    };

    const hideViolationModal = () => {
      $('violation-modal').classList.add('hidden');
      $('overlay').classList.add('hidden');
    };

    document.querySelectorAll('.nav-btn').forEach((btn) => {
      btn.addEventListener('click', () => {
        document.querySelectorAll('.nav-btn').forEach((b) => b.classList.toggle('active', b === btn));
        document.querySelectorAll('.tab-content').forEach((tab) =>
          tab.classList.toggle('active', tab.id === btn.dataset.tab));
      });
    });

    $('followed-rules').addEventListener('click', () =>
      mutate('POST', '/api/check-in', { outcome: 'followed' }));
    $('violated-rule').addEventListener('click', showViolationModal);
    $('cancel-violation').addEventListener('click', hideViolationModal);
    $('overlay').addEventListener('click', hideViolationModal);
    $('reset-streak').addEventListener('click', () => {
      const note = $('violation-text').value;
      hideViolationModal();
      mutate('POST', '/api/check-in', { outcome: 'violated', note });
    });

    $('rule-form').addEventListener('submit', (event) => {
      event.preventDefault();
      mutate('POST', '/api/rules', { text: $('rule-input').value }).then(() => {
        $('rule-input').value = '';
      });
    });

    $('habit-form').addEventListener('submit', (event) => {
      event.preventDefault();
      mutate('POST', '/api/habits', { text: $('habit-input').value }).then(() => {
        $('habit-input').value = '';
      });
    });

    $('analytics-enabled').addEventListener('change', (event) =>
      mutate('PUT', '/api/settings', { analyticsEnabled: event.target.checked }));
    $('privacy-consent').addEventListener('change', (event) =>
      mutate('PUT', '/api/settings', { privacyConsent: event.target.checked }));

    document.querySelectorAll('.resource-card').forEach((card) => {
      card.addEventListener('click', () => {
        request('POST', '/api/resources/click', {
          category: card.dataset.category,
          resource: card.dataset.name
        }).catch((err) => console.error('click tracking failed', err));
        window.open(card.dataset.url, '_blank', 'noopener');
      });
    });

    request('GET', '/api/state')
      .then(apply)
      .catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;
