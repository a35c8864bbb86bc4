use crate::bucket::BucketKey;
use crate::draft::WasteDraft;
use crate::ledger::RawCategory;

pub fn render_index(shift: &BucketKey, drinks: &BucketKey, draft: &WasteDraft) -> String {
    INDEX_HTML
        .replace("{{SHIFT}}", &escape_html(&shift.to_string()))
        .replace("{{DRINKS}}", &escape_html(&drinks.to_string()))
        .replace("{{COUNT}}", &draft.items().len().to_string())
        .replace("{{ROWS}}", &draft_rows(draft))
}

fn draft_rows(draft: &WasteDraft) -> String {
    if draft.is_empty() {
        return r#"<li class="empty">Список порожній</li>"#.to_string();
    }
    draft
        .items()
        .iter()
        .map(|item| {
            let tag = match item.category {
                RawCategory::Food => "food",
                RawCategory::Drink => "drink",
                RawCategory::Ingredient => "ingredient",
            };
            format!(
                r#"<li class="row {tag}"><span>{}</span><span class="amount">{}</span></li>"#,
                escape_html(&item.product),
                item.amount
            )
        })
        .collect()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="uk">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Списання</title>
  <style>
    :root {
      --bg: #f7f3ea;
      --ink: #2b2a28;
      --accent: #d62300;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(760px, 100%);
      background: var(--card);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
    }

    .buckets {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
    }

    .bucket {
      background: white;
      border-radius: 14px;
      padding: 10px 14px;
      border: 1px solid rgba(47, 72, 88, 0.1);
    }

    .bucket .label {
      font-size: 0.75rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: #8b857d;
      display: block;
    }

    form {
      display: grid;
      grid-template-columns: 2fr 1fr 1fr auto;
      gap: 10px;
    }

    input, select, button {
      font: inherit;
      padding: 10px 12px;
      border-radius: 10px;
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    button {
      border: none;
      font-weight: 600;
      cursor: pointer;
      color: white;
      background: var(--accent-2);
    }

    button.save {
      background: var(--accent);
    }

    ul {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 8px;
    }

    .row {
      display: flex;
      justify-content: space-between;
      background: white;
      border-radius: 10px;
      padding: 10px 14px;
      border-left: 4px solid var(--accent-2);
    }

    .row.drink {
      border-left-color: #2d7a4b;
    }

    .row.ingredient {
      border-left-color: #c88a12;
    }

    .amount {
      font-weight: 600;
    }

    .thumb {
      width: 28px;
      height: 28px;
      object-fit: contain;
    }

    .empty {
      color: #8b857d;
    }

    .actions {
      display: flex;
      gap: 10px;
    }

    .status {
      min-height: 1.2em;
      color: #6b645d;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }

    @media (max-width: 600px) {
      form {
        grid-template-columns: 1fr;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <h1>Списання</h1>

    <section class="buckets">
      <div class="bucket"><span class="label">Зміна</span><span id="shift">{{SHIFT}}</span></div>
      <div class="bucket"><span class="label">Напої</span><span id="drinks">{{DRINKS}}</span></div>
      <div class="bucket"><span class="label">Позицій</span><span id="count">{{COUNT}}</span></div>
    </section>

    <form id="add-form">
      <input id="product" name="product" placeholder="Продукт" required />
      <select id="category" name="category">
        <option value="burgers">Бургери</option>
        <option value="snacks">Снеки</option>
        <option value="fries">Картопля</option>
        <option value="sauces">Соуси</option>
        <option value="drinks">Напої</option>
        <option value="desserts">Десерти</option>
        <option value="ingredients">Інгредієнти</option>
      </select>
      <input id="amount" name="amount" inputmode="decimal" placeholder="1" />
      <button type="submit">Додати</button>
    </form>

    <ul id="draft">{{ROWS}}</ul>

    <section class="actions">
      <button class="save" id="save" type="button">Зберегти</button>
      <button id="clear" type="button">Очистити</button>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const draftEl = document.getElementById('draft');
    const countEl = document.getElementById('count');
    const statusEl = document.getElementById('status');

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const renderDraft = (items, images) => {
      countEl.textContent = items.length;
      draftEl.replaceChildren();
      if (!items.length) {
        const li = document.createElement('li');
        li.className = 'empty';
        li.textContent = 'Список порожній';
        draftEl.appendChild(li);
        return;
      }
      items.forEach((item) => {
        const li = document.createElement('li');
        li.className = `row ${item.category}`;
        const name = document.createElement('span');
        name.textContent = item.product;
        const image = images && images[item.product];
        if (image) {
          const img = document.createElement('img');
          img.src = image;
          img.alt = '';
          img.className = 'thumb';
          li.appendChild(img);
        }
        const amount = document.createElement('span');
        amount.className = 'amount';
        amount.textContent = item.amount;
        li.append(name, amount);
        draftEl.appendChild(li);
      });
    };

    const request = async (url, options) => {
      const res = await fetch(url, options);
      if (!res.ok && res.status !== 207) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.json();
    };

    document.getElementById('add-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const amountText = document.getElementById('amount').value.trim();
      const body = {
        product: document.getElementById('product').value,
        category: document.getElementById('category').value,
        amount: amountText === '' ? null : Number(amountText)
      };
      request('/api/draft/items', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body)
      })
        .then((data) => {
          renderDraft(data.items, data.images);
          document.getElementById('amount').value = '';
          setStatus('', '');
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('save').addEventListener('click', () => {
      setStatus('Збереження...', 'info');
      request('/api/draft/save', { method: 'POST' })
        .then((data) => {
          renderDraft(data.remaining);
          if (data.failed.length) {
            const names = data.failed.map((f) => f.item.product).join(', ');
            setStatus(`Не збережено: ${names}. Перевірте підключення та спробуйте ще раз.`, 'error');
          } else {
            setStatus('Дані збережені успішно', 'ok');
          }
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('clear').addEventListener('click', () => {
      request('/api/draft', { method: 'DELETE' })
        .then((data) => renderDraft(data.items, data.images))
        .catch((err) => setStatus(err.message, 'error'));
    });
  </script>
</body>
</html>
"#;
