// Built-in seed data. Columns are English, Norwegian, Lithuanian; item rows
// also carry the category position and the quantity.

/// Name of the starter list
pub(crate) const LIST_NAME: [&str; 3] = ["Food", "Mat", "Maistas"];

/// Starter categories in display order
pub(crate) const CATEGORIES: [[&str; 3]; 17] = [
    ["🍿 Snacks", "🍿 Snacks", "🍿 Užkandžiai"],
    ["🥛 Dairy Products", "🥛 Meieriprodukter", "🥛 Pieno produktai"],
    ["🍦 Frozen Products", "🍦 Frosne produkter", "🍦 Šaldyti produktai"],
    ["💊 Supplements", "💊 Kosttilskudd", "💊 Papildai"],
    ["🍞 Bread and Rolls", "🍞 Brød og rundstykker", "🍞 Duona ir bandelės"],
    ["🥬 Vegetables", "🥬 Grønnsaker", "🥬 Daržovės"],
    ["🍎 Fruits and Berries", "🍎 Frukt og bær", "🍎 Vaisiai ir uogos"],
    ["🥜 Nuts and Seeds", "🥜 Nøtter og frø", "🥜 Riešutai ir sėklos"],
    ["🧀 Cheeses", "🧀 Oster", "🧀 Sūriai"],
    ["🥩 Meat and Fish", "🥩 Kjøtt og fisk", "🥩 Mėsa ir žuvis"],
    ["🌮 Taco Products", "🌮 Taco-produkter", "🌮 Taco produktai"],
    ["🍚 Grains and Flour", "🍚 Korn og mel", "🍚 Kruopos ir miltai"],
    ["🥫 Canned Goods", "🥫 Hermetikk", "🥫 Konservai"],
    ["🍪 Dry Products", "🍪 Tørrvarer", "🍪 Sausieji produktai"],
    ["🧂 Spices and Sauces", "🧂 Krydder og sauser", "🧂 Prieskoniai ir padažai"],
    ["🥤 Beverages", "🥤 Drikkevarer", "🥤 Gėrimai"],
    ["🧻 Household Items", "🧻 Husholdningsartikler", "🧻 Namų ūkio prekės"],
];

/// Starter items: names, category position, quantity
pub(crate) const ITEMS: [([&str; 3], usize, i32); 116] = [
    // Snacks
    (["Chips", "Chips", "Čipsų"], 0, 1),
    (["Popcorn 🍿", "Popcorn 🍿", "Popkornų 🍿"], 0, 1),
    (["Dried Mango", "Tørket mango", "Džiovintų mango"], 0, 1),

    // Dairy Products
    (["Greek Yogurt", "Gresk yoghurt", "Graikiško jogurto"], 1, 1),
    (["Cottage Cheese", "Cottage cheese", "Varškės"], 1, 1),
    (["Coffee Milk 🥛", "Kaffemelk 🥛", "Kavos pieno 🥛"], 1, 1),
    (["Almond Milk", "Mandelmelk", "Migdolų pieno"], 1, 1),
    (["Regular Milk 🥛", "Vanlig melk 🥛", "Paprasto pieno 🥛"], 1, 1),
    (["Biola", "Biola", "Biolos"], 1, 1),
    (["Eggs 🥚", "Egg 🥚", "Kiaušinių 🥚"], 1, 1),
    (["Butter 🧈", "Smør 🧈", "Sviesto 🧈"], 1, 1),
    (["Mayonnaise", "Majones", "Majonezo"], 1, 1),
    (["Melted Butter", "Smeltet smør", "Tirpinto sviesto"], 1, 1),
    (["Condensed Milk", "Kondensert melk", "Kondensūoto pieno"], 1, 1),
    (["Yogurts", "Yoghurt", "Jogurtukų"], 1, 1),
    (["Sour Cream Black", "Rømme svart", "Grietinės juodos"], 1, 1),
    (["Cream", "Fløte", "Grietinėlės"], 1, 1),

    // Frozen Products
    (["Frozen Mango", "Frossen mango", "Šaldyto mango"], 2, 1),
    (["Ice Cream Box 🍦", "Isboks 🍦", "Dėžutė ledų 🍦"], 2, 1),
    (["Frozen Cherries", "Frosne kirsebær", "Višnių šaldytų"], 2, 1),
    (["Frozen French Fries", "Frosne pommes frites", "Bulvyčių fri šaldytų"], 2, 1),

    // Supplements
    (["Vitamin C", "Vitamin C", "Vitamino C"], 3, 1),
    (["Ginseng", "Ginseng", "Ženšenio"], 3, 1),

    // Bread and Rolls
    (["Frozen Rolls", "Frosne rundstykker", "Šaldytų bandelių"], 4, 1),
    (["Panini", "Panini", "Panini"], 4, 1),
    (["Croissants 🥐", "Croissanter 🥐", "Kruasanų 🥐"], 4, 1),
    (["Bread 🍞", "Brød 🍞", "Duonos 🍞"], 4, 1),
    (["Burger Buns 🍔", "Burgerbrød 🍔", "Burgerių bandelių 🍔"], 4, 1),
    (["Garlic Bread", "Hvitløksbrød", "Duonelė hvitløk kepimui"], 4, 1),

    // Vegetables
    (["Iceberg Lettuce 🥬", "Isbergsalat 🥬", "Iceberg salotos 🥬"], 5, 1),
    (["Beets", "Rødbeter", "Burokėlių"], 5, 1),
    (["Cucumber 🥒", "Agurk 🥒", "Agurko 🥒"], 5, 1),
    (["Avocado 🥑", "Avokado 🥑", "Avokado 🥑"], 5, 1),
    (["Mint", "Mynte", "Mėtos"], 5, 1),
    (["Carrots 🥕", "Gulrøtter 🥕", "Morkų 🥕"], 5, 1),
    (["Sprouts", "Spirer", "Daigėlių"], 5, 1),
    (["Salad Mix", "Salatblanding", "Salotų maišelis"], 5, 1),
    (["Onions 🧄", "Løk 🧄", "Svogūnėlių 🧄"], 5, 1),
    (["Cauliflower", "Blomkål", "Žiedinio kopūsto"], 5, 1),
    (["Basil", "Basilikum", "Baziliko"], 5, 1),
    (["Regular Potatoes", "Vanlige poteter", "Bulvių paprastų"], 5, 1),
    (["Sweet Potatoes", "Søtpoteter", "Bulvės saldžios"], 5, 2),
    (["Bell Peppers 🌶️", "Paprika 🌶️", "Paprikos 🌶️"], 5, 1),
    (["Cherry Tomatoes 🍅", "Cherrytomater 🍅", "Pomidoriukų 🍅"], 5, 1),
    (["Pickled Cucumbers", "Syltede agurker", "Raugintų agurkų"], 5, 1),

    // Fruits and Berries
    (["Mango 🥭", "Mango 🥭", "Mango 🥭"], 6, 1),
    (["Nectarines", "Nektariner", "Nektarinų"], 6, 1),
    (["Watermelon", "Vannmelon", "Arbūzo"], 6, 1),
    (["Berries 🍓🫐", "Bær 🍓🫐", "Uogų 🍓🫐"], 6, 1),
    (["Oranges", "Appelsiner", "Apelsinų"], 6, 1),
    (["Apples 🍏", "Epler 🍏", "Obuolių 🍏"], 6, 1),
    (["Mandarins", "Mandariner", "Mandarinų"], 6, 1),
    (["Persimmons", "Persimmon", "Persimonų"], 6, 1),
    (["Lemons", "Sitroner", "Citrinų"], 6, 1),
    (["Strawberries 🍓", "Jordbær 🍓", "Braškių 🍓"], 6, 1),
    (["Pumpkin", "Gresskar", "Moliūgo"], 6, 1),
    (["Bananas 🍌", "Bananer 🍌", "Bananų 🍌"], 6, 1),
    (["Kiwi", "Kiwi", "Kiwi"], 6, 1),

    // Nuts and Seeds
    (["Mixed Nuts", "Blandede nøtter", "Riešutų mix"], 7, 1),
    (["Pine Nuts", "Pinjekjerner", "Kedro riešutėlių"], 7, 1),
    (["Sesame Seeds", "Sesamfrø", "Sezamo sėklų"], 7, 1),
    (["Pumpkin Seeds", "Gresskarfrø", "Moliūgo sėklų"], 7, 1),

    // Cheeses
    (["Grated Cheese", "Revet ost", "Tarkuoto sūrio"], 8, 1),
    (["Cream Cheese", "Kremost", "Tepamo sūrelio"], 8, 1),
    (["Cheese", "Ost", "Sūrio"], 8, 1),
    (["Mozzarella", "Mozzarella", "Mozzarelos"], 8, 1),
    (["Feta", "Feta", "Fetos"], 8, 1),

    // Meat and Fish
    (["Meatballs", "Kjøttboller", "Mėsyčių"], 9, 1),
    (["Ham", "Skinke", "Kumpėlio"], 9, 1),
    (["Beef", "Biff", "Jautienos"], 9, 1),
    (["Chicken Fillet", "Kyllingfilet", "Vištienos filė"], 9, 1),
    (["Skinkeost", "Skinkeost", "Skinkeost"], 9, 1),
    (["Salmon", "Laks", "Lašišos"], 9, 1),
    (["Diced Ham", "Terninger skinke", "Šinkės mažais gabaliukais"], 9, 1),
    (["Ground Meat", "Kjøttdeig", "Faršo"], 9, 1),
    (["Bacon Strips 🥓", "Baconstriper 🥓", "Bacon juostelių 🥓"], 9, 1),
    (["Cooked Shrimp", "Kokte reker", "Krevetės keptos iš Remos"], 9, 12),

    // Taco Products
    (["Taco Wraps 🌮", "Taco-lefser 🌮", "Taco lavašiukų 🌮"], 10, 1),
    (["Small Taco Wraps", "Små taco-lefser", "Taco lavašiukų mažiukų"], 10, 1),
    (["Taco Seasoning", "Taco-krydder", "Taco prieskonių"], 10, 1),
    (["Taco Shells 🌮", "Taco-skjell 🌮", "Taco laivėlių 🌮"], 10, 1),

    // Grains and Flour
    (["Rice", "Ris", "Ryžių"], 11, 1),
    (["Puff Pastry", "Butterdeig", "Sluoksniuotos tešlos"], 11, 1),
    (["Flour", "Mel", "Miltų"], 11, 1),
    (["Semolina", "Semulegryn", "Manai"], 11, 1),

    // Canned Goods
    (["Tomato Puree 🍅", "Tomatpuré 🍅", "Pomidorų tyrės skardinės 🍅"], 12, 1),
    (["Corn 🌽", "Mais 🌽", "Kukurūzų 🌽"], 12, 1),
    (["Canned Peas", "Hermetiske erter", "Konservuotų žirnelių 2vnt"], 12, 1),
    (["Canned Corn", "Hermetisk mais", "Konservuotų kukurūzų"], 12, 1),
    (["Jam", "Syltetøy", "Uogienė"], 12, 1),
    (["Canned Beans", "Hermetiske bønner", "Koncerv. Pupelės"], 12, 1),

    // Dry Products
    (["Crackers", "Kjeks", "Trapučių"], 13, 1),
    (["Granola", "Granola", "Granolų"], 13, 1),
    (["Bread Crumbs", "Brødsmuler", "Duonos skrebučių"], 13, 1),
    (["Powdered Sugar", "Melis", "Cukraus pudros"], 13, 1),
    (["Sugar", "Sukker", "Cukraus"], 13, 1),
    (["Salt", "Salt", "Druskos"], 13, 1),
    (["Baking Powder", "Bakepulver", "Kepimo miltelių"], 13, 1),
    (["Breakfast Cereal", "Frokostblanding", "Sausų pusryčių"], 13, 1),
    (["Chickpeas", "Kikerter", "Avinžirnių"], 13, 1),

    // Spices and Sauces
    (["Pesto", "Pesto", "Pesto"], 14, 1),
    (["Soy Sauce", "Soyasaus", "Sojų"], 14, 1),
    (["Bouillon Cubes", "Buljonterninger", "Sultinio kubelių"], 14, 1),
    (["Mustard", "Sennep", "Garstyčių"], 14, 1),
    (["Karma Spice Jar", "Karma krydderglass", "Karma prieskonių slovikėlis"], 14, 1),
    (["Lemon Concentrate", "Sitronkonsentrat", "Citrinos koncentrato buteliukyje"], 14, 1),

    // Beverages
    (["Sprite", "Sprite", "Sprite"], 15, 1),
    (["Non-Alcoholic Beer", "Alkoholfritt øl", "Nealkoholinio alaus"], 15, 1),
    (["Mineral Water", "Mineralvann", "Mineralinio"], 15, 1),
    (["Schweppes", "Schweppes", "Švepsas"], 15, 1),

    // Household Items
    (["Toilet Paper", "Toalettpapir", "Tualetinio popieriaus"], 16, 1),
    (["Paper Towels", "Kjøkkenpapir", "Rankų popieriaus"], 16, 1),
    (["Baking Paper", "Bakepapir", "Kepimo popieriaus"], 16, 1),
    (["Trash Bags", "Søppelposer", "Siuksliu Maisu"], 16, 1),
    (["Shower Gel", "Dusjgel", "Dušo žele"], 16, 1),
    (["Dishwasher Tablets", "Oppvasktabletter", "Indaploves tabletes"], 16, 1),
];
